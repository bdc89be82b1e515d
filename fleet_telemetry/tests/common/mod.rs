#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use fleet_telemetry::{
    models::{
        capability::CapabilitySupport,
        device::{Device, StatusInfo},
        identifier::Vin,
        reading::{DiagnosticId, Reading, ReadingPage, ReadingQuery, SortOrder},
    },
    providers::{
        ApiSnafu, CapabilityError, CapabilityService, ProviderError, StatusSnafu, SupportObservation,
        TelemetrySource,
    },
};
use secrecy::SecretString;

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// In-memory fleet that answers queries like a well-behaved platform:
/// inclusive bounds, ascending order when asked, `limit` rows at most.
#[derive(Default)]
pub struct FakeFleet {
    pub devices: Vec<Device>,
    pub statuses: Vec<StatusInfo>,
    pub readings: Vec<(DiagnosticId, Reading)>,
    pub queries: Mutex<Vec<ReadingQuery>>,
    /// When set, listing devices fails with this API message.
    pub devices_error: Option<String>,
    /// When set, queries for this diagnostic fail with an API error.
    pub failing_diagnostic: Option<DiagnosticId>,
}

impl FakeFleet {
    pub fn reading(mut self, diagnostic: DiagnosticId, reading: Reading) -> Self {
        self.readings.push((diagnostic, reading));
        self
    }

    pub fn queries_for(&self, diagnostic: &DiagnosticId) -> Vec<ReadingQuery> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| &q.diagnostic == diagnostic)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TelemetrySource for FakeFleet {
    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError> {
        if let Some(message) = &self.devices_error {
            return ApiSnafu { message }.fail();
        }
        Ok(self.devices.clone())
    }

    async fn query_readings(&self, query: &ReadingQuery) -> Result<ReadingPage, ProviderError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing_diagnostic.as_ref() == Some(&query.diagnostic) {
            return ApiSnafu {
                message: format!("{} unavailable", query.diagnostic),
            }
            .fail();
        }
        let mut rows: Vec<Reading> = self
            .readings
            .iter()
            .filter(|(d, r)| d == &query.diagnostic && r.timestamp >= query.from && r.timestamp <= query.to)
            .map(|(_, r)| r.clone())
            .collect();
        if query.sort == Some(SortOrder::Ascending) {
            rows.sort_by_key(|r| r.timestamp);
        }
        rows.truncate(query.limit);
        Ok(ReadingPage::from_readings(rows))
    }

    async fn list_status_info(&self) -> Result<Vec<StatusInfo>, ProviderError> {
        Ok(self.statuses.clone())
    }
}

/// Source that ignores the cursor and always serves the same full page.
pub struct StuckFleet {
    pub page: Vec<Reading>,
    pub requests: Mutex<usize>,
}

#[async_trait]
impl TelemetrySource for StuckFleet {
    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError> {
        Ok(vec![])
    }

    async fn query_readings(&self, _query: &ReadingQuery) -> Result<ReadingPage, ProviderError> {
        *self.requests.lock().unwrap() += 1;
        Ok(ReadingPage::from_readings(self.page.clone()))
    }

    async fn list_status_info(&self) -> Result<Vec<StatusInfo>, ProviderError> {
        Ok(vec![])
    }
}

/// Capability service backed by a fixed table, recording every batch.
#[derive(Default)]
pub struct FakeCapability {
    pub table: Vec<(Vin, CapabilitySupport)>,
    /// Observation appended to every batch response.
    pub every_batch: Option<Box<dyn Fn(usize) -> SupportObservation + Send + Sync>>,
    /// 1-based batch index answered with HTTP 503.
    pub failing_batch: Option<usize>,
    pub batches: Mutex<Vec<Vec<Vin>>>,
}

impl FakeCapability {
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl CapabilityService for FakeCapability {
    async fn lookup(
        &self,
        vins: &[Vin],
        _region: u32,
        _credential: &SecretString,
    ) -> Result<Vec<SupportObservation>, CapabilityError> {
        let index = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(vins.to_vec());
            batches.len()
        };
        if self.failing_batch == Some(index) {
            return StatusSnafu {
                status: 503u16,
                body: "service unavailable",
            }
            .fail();
        }
        let mut out: Vec<SupportObservation> = self
            .table
            .iter()
            .filter(|(vin, _)| vins.contains(vin))
            .map(|(vin, support)| SupportObservation {
                vin: vin.clone(),
                support: support.clone(),
            })
            .collect();
        if let Some(extra) = &self.every_batch {
            out.push(extra(index));
        }
        Ok(out)
    }
}

pub fn vin(raw: &str) -> Vin {
    Vin::normalize(Some(raw)).unwrap()
}

pub fn token() -> SecretString {
    SecretString::new("Bearer test-token".into())
}
