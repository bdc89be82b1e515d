//! Plain-text tables for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use fleet_telemetry::{
    models::row::VehicleRow,
    views::{
        FlaggedSummary,
        format::{fmt_age, fmt_number, fmt_pct, fmt_timestamp},
    },
};

const ALERT_MARK: &str = "!!";

fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().copied(), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

pub fn odometer_table(rows: &[&VehicleRow], now: DateTime<Utc>) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.vehicle.clone(),
                r.brand_model.clone().unwrap_or_else(|| "-".into()),
                r.odometer_source.to_string(),
                fmt_number(r.odometer_km, 1),
                fmt_age(r.odometer_timestamp, now),
                fmt_timestamp(r.odometer_timestamp),
                fmt_pct(r.odometer_support_pct),
            ]
        })
        .collect();
    table(
        &["VEHICLE", "MODEL", "SOURCE", "KM", "AGE", "TIMESTAMP", "SUPPORTED"],
        &cells,
    )
}

pub fn engine_table(rows: &[&VehicleRow], now: DateTime<Utc>) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.vehicle.clone(),
                r.brand_model.clone().unwrap_or_else(|| "-".into()),
                r.engine_source.to_string(),
                fmt_number(r.engine_hours, 1),
                fmt_age(r.engine_timestamp, now),
                fmt_timestamp(r.engine_timestamp),
                fmt_pct(r.engine_support_pct),
            ]
        })
        .collect();
    table(
        &["VEHICLE", "MODEL", "SOURCE", "HOURS", "AGE", "TIMESTAMP", "SUPPORTED"],
        &cells,
    )
}

/// Rollup table; flagged groups are marked in the first column.
pub fn rollup_table(summaries: &[FlaggedSummary]) -> String {
    let cells: Vec<Vec<String>> = summaries
        .iter()
        .map(|f| {
            let s = &f.summary;
            vec![
                if f.alert { ALERT_MARK.into() } else { String::new() },
                s.brand_model.clone(),
                s.total.to_string(),
                s.diagnostic_odometer_count.to_string(),
                s.fallback_odometer_count.to_string(),
                fmt_number(Some(s.fallback_odometer_pct), 1),
                s.diagnostic_engine_count.to_string(),
                s.fallback_engine_count.to_string(),
                fmt_number(Some(s.fallback_engine_pct), 1),
            ]
        })
        .collect();
    table(
        &[
            "", "MODEL", "TOTAL", "ODO DIAG", "ODO GPS", "ODO GPS %", "ENG DIAG", "ENG GPS",
            "ENG GPS %",
        ],
        &cells,
    )
}
