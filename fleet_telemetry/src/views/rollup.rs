//! Per-model rollup with threshold flagging.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    models::{
        row::VehicleRow,
        summary::{ModelSummary, NO_MODEL_LABEL, percentage},
    },
    views::sort::{SortState, SummarySortKey, apply},
};

pub const DEFAULT_ALERT_THRESHOLD_PCT: f64 = 20.0;

#[derive(Default)]
struct Tally {
    total: usize,
    fallback_odometer: usize,
    fallback_engine: usize,
}

/// Groups rows by brand/model, in first-seen order. Rows without one share
/// the [`NO_MODEL_LABEL`] group.
pub fn summarize(rows: &[VehicleRow]) -> Vec<ModelSummary> {
    let mut groups: IndexMap<&str, Tally> = IndexMap::new();
    for row in rows {
        let label = row
            .brand_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_MODEL_LABEL);
        let tally = groups.entry(label).or_default();
        tally.total += 1;
        if row.odometer_source.is_fallback() {
            tally.fallback_odometer += 1;
        }
        if row.engine_source.is_fallback() {
            tally.fallback_engine += 1;
        }
    }

    groups
        .into_iter()
        .map(|(label, t)| ModelSummary {
            brand_model: label.to_string(),
            total: t.total,
            diagnostic_odometer_count: t.total - t.fallback_odometer,
            fallback_odometer_count: t.fallback_odometer,
            fallback_odometer_pct: percentage(t.fallback_odometer, t.total),
            diagnostic_engine_count: t.total - t.fallback_engine,
            fallback_engine_count: t.fallback_engine,
            fallback_engine_pct: percentage(t.fallback_engine, t.total),
        })
        .collect()
}

/// A rollup line plus whether it should be presented as an alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedSummary {
    #[serde(flatten)]
    pub summary: ModelSummary,
    pub alert: bool,
}

/// The sorted rollup, each group flagged when its odometer fallback share
/// strictly exceeds `threshold_pct`.
pub fn rollup_view(
    rows: &[VehicleRow],
    sort: &SortState<SummarySortKey>,
    threshold_pct: f64,
) -> Vec<FlaggedSummary> {
    let mut summaries = summarize(rows);
    apply(&mut summaries, sort);
    summaries
        .into_iter()
        .map(|summary| FlaggedSummary {
            alert: summary.exceeds(threshold_pct),
            summary,
        })
        .collect()
}
