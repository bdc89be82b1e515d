//! Wire shapes returned by the platform and their conversion into models.
//!
//! Rows are converted one at a time. A row that does not fit its shape is
//! dropped and counted; it never fails the call.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    models::{
        device::{Device, StatusInfo},
        reading::{Reading, ReadingPage},
    },
    providers::lenient,
};

/// JSON-RPC response envelope.
#[derive(Deserialize, Debug, Default)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RpcError {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::objects")]
    pub errors: Vec<RpcErrorDetail>,
}

#[derive(Deserialize, Debug)]
pub struct RpcErrorDetail {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
}

impl RpcError {
    /// Best human-readable description of the failure.
    pub fn describe(&self) -> String {
        let detail = self.errors.iter().find_map(|e| match (&e.name, &e.message) {
            (Some(name), Some(message)) => Some(format!("{name}: {message}")),
            (None, Some(message)) => Some(message.clone()),
            _ => None,
        });
        detail
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown API error".to_string())
    }
}

impl RpcResponse {
    /// The result rows. A missing or non-array result reads as empty.
    pub fn into_rows(self) -> Vec<Value> {
        match self.result {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct EntityRef {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StatusDataRow {
    #[serde(default, deserialize_with = "lenient::object")]
    device: Option<EntityRef>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    date_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::number")]
    data: Option<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DeviceRow {
    #[serde(default, deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    vehicle_identification_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    odometer: Option<f64>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    active_from: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StatusInfoRow {
    #[serde(default, deserialize_with = "lenient::object")]
    device: Option<EntityRef>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    date_time: Option<DateTime<Utc>>,
}

fn entity_id(device: Option<EntityRef>) -> Option<String> {
    device.and_then(|d| d.id).filter(|id| !id.is_empty())
}

/// Converts raw `StatusData` rows into a page.
///
/// Rows without a device id or a timestamp are skipped, but still count
/// towards `row_count`; `last_timestamp` reflects the raw last row.
pub fn into_reading_page(rows: Vec<Value>) -> ReadingPage {
    let row_count = rows.len();
    let last_timestamp = rows
        .last()
        .and_then(|row| row.get("dateTime"))
        .and_then(Value::as_str)
        .and_then(lenient::parse_datetime);

    let readings: Vec<Reading> = rows
        .into_iter()
        .filter_map(lenient::object_from_value::<StatusDataRow>)
        .filter_map(|row| {
            Some(Reading {
                entity_id: entity_id(row.device)?,
                timestamp: row.date_time?,
                value: row.data,
            })
        })
        .collect();

    if readings.len() < row_count {
        debug!(
            skipped = row_count - readings.len(),
            "dropped malformed StatusData rows"
        );
    }

    ReadingPage {
        readings,
        row_count,
        last_timestamp,
    }
}

/// Converts raw `Device` rows. Rows without an id are skipped.
pub fn into_devices(rows: Vec<Value>) -> Vec<Device> {
    let total = rows.len();
    let devices: Vec<Device> = rows
        .into_iter()
        .filter_map(lenient::object_from_value::<DeviceRow>)
        .filter_map(|row| {
            Some(Device {
                id: row.id.filter(|id| !id.is_empty())?,
                name: row.name,
                vin: row.vehicle_identification_number,
                raw_odometer: row.odometer,
                active_from: row.active_from,
            })
        })
        .collect();
    if devices.len() < total {
        debug!(skipped = total - devices.len(), "dropped malformed Device rows");
    }
    devices
}

/// Converts raw `DeviceStatusInfo` rows. Rows without a device id are skipped.
pub fn into_status_infos(rows: Vec<Value>) -> Vec<StatusInfo> {
    rows.into_iter()
        .filter_map(lenient::object_from_value::<StatusInfoRow>)
        .filter_map(|row| {
            Some(StatusInfo {
                entity_id: entity_id(row.device)?,
                timestamp: row.date_time,
            })
        })
        .collect()
}
