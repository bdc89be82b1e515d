//! Flattening of reconciled rows into named, column-ordered sheets.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use snafu::ensure;

use crate::{
    io::sink::{EmptySnafu, SinkError},
    models::row::VehicleRow,
    views::format::{fmt_age, fmt_timestamp},
};

pub const ODOMETER_SHEET: &str = "odometer";
pub const ENGINE_SHEET: &str = "engine_hours";

/// One named table. Every row carries the same columns in the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<IndexMap<&'static str, Value>>,
}

impl Sheet {
    pub fn columns(&self) -> Vec<&'static str> {
        self.rows
            .first()
            .map(|r| r.keys().copied().collect())
            .unwrap_or_default()
    }
}

fn number(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::from)
}

fn odometer_row(row: &VehicleRow, now: DateTime<Utc>) -> IndexMap<&'static str, Value> {
    IndexMap::from([
        ("vehicle", Value::from(row.vehicle.as_str())),
        ("brand_model", Value::from(row.brand_model.as_deref().unwrap_or_default())),
        ("source", Value::from(row.odometer_source.as_str())),
        ("odometer_km", number(row.odometer_km)),
        ("age", Value::from(fmt_age(row.odometer_timestamp, now))),
        ("timestamp", Value::from(fmt_timestamp(row.odometer_timestamp))),
        ("supported_pct", number(row.odometer_support_pct)),
    ])
}

fn engine_row(row: &VehicleRow, now: DateTime<Utc>) -> IndexMap<&'static str, Value> {
    IndexMap::from([
        ("vehicle", Value::from(row.vehicle.as_str())),
        ("brand_model", Value::from(row.brand_model.as_deref().unwrap_or_default())),
        ("source", Value::from(row.engine_source.as_str())),
        ("engine_hours", number(row.engine_hours)),
        ("age", Value::from(fmt_age(row.engine_timestamp, now))),
        ("timestamp", Value::from(fmt_timestamp(row.engine_timestamp))),
        ("supported_pct", number(row.engine_support_pct)),
    ])
}

/// Builds the odometer and engine-hours sheets for `rows`, in row order.
pub fn export_sheets(rows: &[VehicleRow], now: DateTime<Utc>) -> Result<Vec<Sheet>, SinkError> {
    ensure!(!rows.is_empty(), EmptySnafu);

    Ok(vec![
        Sheet {
            name: ODOMETER_SHEET.to_string(),
            rows: rows.iter().map(|r| odometer_row(r, now)).collect(),
        },
        Sheet {
            name: ENGINE_SHEET.to_string(),
            rows: rows.iter().map(|r| engine_row(r, now)).collect(),
        },
    ])
}
