//! Source-precedence policy: one authoritative row per device.

mod pass;
pub use pass::{DEFAULT_LOOKBACK_DAYS, DEFAULT_REGION, PassOptions, ReconcilePass, ReconciledSet, WindowStrategy};

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    models::{
        capability::CapabilitySupport,
        device::{Device, StatusInfo},
        identifier::Vin,
        row::{EngineSource, OdometerSource, VehicleRow},
    },
    requests::ReadingsByEntity,
};

pub const METERS_PER_KM: f64 = 1000.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Device snapshots above this are taken to be meters, otherwise kilometers.
///
/// The snapshot field reports different units on different hardware
/// generations; no vehicle plausibly exceeds a million kilometers.
pub const SNAPSHOT_METERS_THRESHOLD: f64 = 1_000_000.0;

pub fn meters_to_km(meters: f64) -> f64 {
    meters / METERS_PER_KM
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

/// Normalizes a device snapshot odometer to kilometers.
pub fn snapshot_odometer_to_km(raw: f64) -> f64 {
    if raw > SNAPSHOT_METERS_THRESHOLD {
        meters_to_km(raw)
    } else {
        raw
    }
}

/// Whole minutes elapsed between `timestamp` and `now`, floored.
///
/// Timestamps in the future read as zero.
pub fn age_minutes(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    timestamp.map(|ts| (now - ts).num_minutes().max(0))
}

/// Everything the reconciler needs besides the device list.
#[derive(Debug, Default, Clone)]
pub struct ReconcileInputs {
    /// Latest in-window odometer reading per device (meters).
    pub window_odometer: ReadingsByEntity,
    /// Latest in-window engine-hours reading per device (seconds).
    pub window_engine: ReadingsByEntity,
    /// Point-in-time odometer adjustment per device (meters).
    pub odometer_adjustments: ReadingsByEntity,
    /// Last known status time per device.
    pub status_timestamps: HashMap<String, DateTime<Utc>>,
    pub support: HashMap<Vin, CapabilitySupport>,
}

/// Indexes status records by device. A later record for the same device
/// replaces the earlier one, even when it has no timestamp.
pub fn status_timestamps(infos: Vec<StatusInfo>) -> HashMap<String, DateTime<Utc>> {
    let mut by_device = HashMap::with_capacity(infos.len());
    for info in infos {
        match info.timestamp {
            Some(ts) => {
                by_device.insert(info.entity_id, ts);
            }
            None => {
                by_device.remove(&info.entity_id);
            }
        }
    }
    by_device
}

/// Builds one row per device, in device order.
pub fn reconcile(devices: &[Device], inputs: &ReconcileInputs, now: DateTime<Utc>) -> Vec<VehicleRow> {
    devices
        .iter()
        .map(|device| reconcile_device(device, inputs, now))
        .collect()
}

fn reconcile_device(device: &Device, inputs: &ReconcileInputs, now: DateTime<Utc>) -> VehicleRow {
    let empty = CapabilitySupport::default();
    let support = Vin::normalize(device.vin.as_deref())
        .and_then(|vin| inputs.support.get(&vin))
        .unwrap_or(&empty);

    let (odometer_source, odometer_km, odometer_timestamp) =
        match inputs.window_odometer.get(&device.id) {
            Some(reading) => (
                OdometerSource::DeviceDiagnostic,
                reading.value.map(meters_to_km),
                Some(reading.timestamp),
            ),
            None => {
                let adjustment = inputs
                    .odometer_adjustments
                    .get(&device.id)
                    .and_then(|r| r.value);
                let km = match adjustment {
                    Some(meters) => Some(meters_to_km(meters)),
                    None => device.raw_odometer.map(snapshot_odometer_to_km),
                };
                (
                    OdometerSource::GpsDerived,
                    km,
                    inputs.status_timestamps.get(&device.id).copied(),
                )
            }
        };

    let (engine_source, engine_hours, engine_timestamp) = match inputs.window_engine.get(&device.id) {
        Some(reading) => (
            EngineSource::EngineDiagnostic,
            reading.value.map(seconds_to_hours),
            Some(reading.timestamp),
        ),
        None => (EngineSource::GpsDerived, None, None),
    };

    VehicleRow {
        vehicle: device.display_name().to_string(),
        brand_model: support.brand_model.clone(),
        odometer_source,
        odometer_km,
        odometer_timestamp,
        odometer_age_minutes: age_minutes(odometer_timestamp, now),
        odometer_support_pct: support.odometer_support_pct,
        engine_source,
        engine_hours,
        engine_timestamp,
        engine_age_minutes: age_minutes(engine_timestamp, now),
        engine_support_pct: support.engine_hours_support_pct,
    }
}
