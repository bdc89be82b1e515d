//! Time-series readings and the query shape used to page through them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named telemetry channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticId(pub String);

impl DiagnosticId {
    pub const ODOMETER: &'static str = "DiagnosticOdometerId";
    pub const ODOMETER_ADJUSTMENT: &'static str = "DiagnosticOdometerAdjustmentId";
    pub const ENGINE_HOURS: &'static str = "DiagnosticEngineHoursId";

    pub fn odometer() -> Self {
        Self(Self::ODOMETER.to_string())
    }

    pub fn odometer_adjustment() -> Self {
        Self(Self::ODOMETER_ADJUSTMENT.to_string())
    }

    pub fn engine_hours() -> Self {
        Self(Self::ENGINE_HOURS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One observation of a diagnostic for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    /// Raw value in the diagnostic's native unit. Sources may report `null`.
    pub value: Option<f64>,
}

impl Reading {
    pub fn new(entity_id: impl Into<String>, timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self {
            entity_id: entity_id.into(),
            timestamp,
            value,
        }
    }
}

/// Sort order requested from a time-series source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parameters for one time-series request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingQuery {
    pub diagnostic: DiagnosticId,
    /// Inclusive lower bound.
    pub from: DateTime<Utc>,
    /// Inclusive upper bound.
    pub to: DateTime<Utc>,
    /// `None` leaves ordering to the source.
    pub sort: Option<SortOrder>,
    pub limit: usize,
}

/// One page of readings as returned by a source.
///
/// `readings` only holds well-formed rows. `row_count` and `last_timestamp`
/// describe the raw page so pagination decisions are not skewed by rows that
/// were dropped while parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadingPage {
    pub readings: Vec<Reading>,
    /// Number of rows the source returned, malformed ones included.
    pub row_count: usize,
    /// Timestamp of the raw last row, if it had a parseable one.
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl ReadingPage {
    /// Builds a page in which every returned row was well-formed.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        let last_timestamp = readings.last().map(|r| r.timestamp);
        Self {
            row_count: readings.len(),
            last_timestamp,
            readings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}
