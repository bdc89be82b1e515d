//! The reconciled per-vehicle record.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a row's odometer value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OdometerSource {
    /// A reading of the odometer diagnostic inside the scanned window.
    DeviceDiagnostic,
    /// An adjustment reading or the device snapshot.
    GpsDerived,
}

impl OdometerSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceDiagnostic => "DEVICE_DIAGNOSTIC",
            Self::GpsDerived => "GPS_DERIVED",
        }
    }

    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::GpsDerived)
    }
}

impl fmt::Display for OdometerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a row's engine-hours value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineSource {
    /// A reading of the engine-hours diagnostic inside the scanned window.
    EngineDiagnostic,
    /// No diagnostic reading; the row carries no engine-hours value.
    GpsDerived,
}

impl EngineSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EngineDiagnostic => "ENGINE_DIAGNOSTIC",
            Self::GpsDerived => "GPS_DERIVED",
        }
    }

    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::GpsDerived)
    }
}

impl fmt::Display for EngineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authoritative row per vehicle.
///
/// Each row carries exactly one odometer provenance and exactly one engine
/// provenance; the enums make "both" unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRow {
    /// Device name, or device id when the device is unnamed.
    pub vehicle: String,
    pub brand_model: Option<String>,

    pub odometer_source: OdometerSource,
    pub odometer_km: Option<f64>,
    pub odometer_timestamp: Option<DateTime<Utc>>,
    /// Whole minutes since `odometer_timestamp`, never negative.
    pub odometer_age_minutes: Option<i64>,
    pub odometer_support_pct: Option<f64>,

    pub engine_source: EngineSource,
    pub engine_hours: Option<f64>,
    pub engine_timestamp: Option<DateTime<Utc>>,
    /// Whole minutes since `engine_timestamp`, never negative.
    pub engine_age_minutes: Option<i64>,
    pub engine_support_pct: Option<f64>,
}

/// A source name that matches no known source kind.
#[derive(Debug, Error)]
#[error("Unknown source kind: {0}")]
pub struct UnknownSourceError(pub String);

impl FromStr for OdometerSource {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "DEVICE_DIAGNOSTIC" | "DIAGNOSTIC" => Ok(Self::DeviceDiagnostic),
            "GPS_DERIVED" | "GPS" => Ok(Self::GpsDerived),
            _ => Err(UnknownSourceError(s.to_string())),
        }
    }
}

impl FromStr for EngineSource {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "ENGINE_DIAGNOSTIC" | "DIAGNOSTIC" => Ok(Self::EngineDiagnostic),
            "GPS_DERIVED" | "GPS" => Ok(Self::GpsDerived),
            _ => Err(UnknownSourceError(s.to_string())),
        }
    }
}
