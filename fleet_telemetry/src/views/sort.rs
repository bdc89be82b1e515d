//! Type-aware, stable single-key sorting.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{row::VehicleRow, summary::ModelSummary};

/// The comparable projection of one field.
///
/// Missing dates sort as the earliest instant and missing numbers as the
/// smallest number, so both come first in ascending order. Text compares
/// case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Date(Option<DateTime<Utc>>),
    Number(Option<f64>),
    Text(String),
}

impl SortValue {
    pub fn text(value: Option<&str>) -> Self {
        Self::Text(value.unwrap_or_default().to_lowercase())
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.total_cmp(b),
            },
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // One key always projects to one variant.
            _ => Ordering::Equal,
        }
    }
}

/// Something a view can sort by a key.
pub trait Sortable {
    type Key: Copy;

    fn sort_value(&self, key: Self::Key) -> SortValue;
}

impl<T: Sortable + ?Sized> Sortable for &T {
    type Key = T::Key;

    fn sort_value(&self, key: Self::Key) -> SortValue {
        (**self).sort_value(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Current sort key and direction of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
    /// Direction applied whenever a different key is selected.
    reset_to: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    /// Row views start ascending and reset to ascending on a new key.
    pub fn for_rows(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
            reset_to: SortDirection::Ascending,
        }
    }

    /// The rollup starts descending and resets to descending on a new key,
    /// so the worst offenders surface first.
    pub fn for_rollup(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
            reset_to: SortDirection::Descending,
        }
    }

    /// Selecting the current key flips direction; a new key resets it.
    pub fn select(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = self.reset_to;
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Stable in-place sort of `items` by `state`.
pub fn apply<T: Sortable>(items: &mut [T], state: &SortState<T::Key>) {
    items.sort_by(|a, b| {
        let ord = a.sort_value(state.key).compare(&b.sort_value(state.key));
        match state.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// A sort key name that matches no column.
#[derive(Debug, Error)]
#[error("Unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

/// Columns of the odometer and engine row views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSortKey {
    Vehicle,
    BrandModel,
    OdometerSource,
    OdometerKm,
    OdometerTimestamp,
    OdometerAge,
    OdometerSupport,
    EngineSource,
    EngineHours,
    EngineTimestamp,
    EngineAge,
    EngineSupport,
}

impl RowSortKey {
    pub const ALL: [Self; 12] = [
        Self::Vehicle,
        Self::BrandModel,
        Self::OdometerSource,
        Self::OdometerKm,
        Self::OdometerTimestamp,
        Self::OdometerAge,
        Self::OdometerSupport,
        Self::EngineSource,
        Self::EngineHours,
        Self::EngineTimestamp,
        Self::EngineAge,
        Self::EngineSupport,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::BrandModel => "brand_model",
            Self::OdometerSource => "odometer_source",
            Self::OdometerKm => "odometer_km",
            Self::OdometerTimestamp => "odometer_timestamp",
            Self::OdometerAge => "odometer_age",
            Self::OdometerSupport => "odometer_support",
            Self::EngineSource => "engine_source",
            Self::EngineHours => "engine_hours",
            Self::EngineTimestamp => "engine_timestamp",
            Self::EngineAge => "engine_age",
            Self::EngineSupport => "engine_support",
        }
    }
}

impl fmt::Display for RowSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowSortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

fn minutes(value: Option<i64>) -> SortValue {
    SortValue::Number(value.map(|m| m as f64))
}

impl Sortable for VehicleRow {
    type Key = RowSortKey;

    fn sort_value(&self, key: RowSortKey) -> SortValue {
        match key {
            RowSortKey::Vehicle => SortValue::text(Some(self.vehicle.as_str())),
            RowSortKey::BrandModel => SortValue::text(self.brand_model.as_deref()),
            RowSortKey::OdometerSource => SortValue::text(Some(self.odometer_source.as_str())),
            RowSortKey::OdometerKm => SortValue::Number(self.odometer_km),
            RowSortKey::OdometerTimestamp => SortValue::Date(self.odometer_timestamp),
            RowSortKey::OdometerAge => minutes(self.odometer_age_minutes),
            RowSortKey::OdometerSupport => SortValue::Number(self.odometer_support_pct),
            RowSortKey::EngineSource => SortValue::text(Some(self.engine_source.as_str())),
            RowSortKey::EngineHours => SortValue::Number(self.engine_hours),
            RowSortKey::EngineTimestamp => SortValue::Date(self.engine_timestamp),
            RowSortKey::EngineAge => minutes(self.engine_age_minutes),
            RowSortKey::EngineSupport => SortValue::Number(self.engine_support_pct),
        }
    }
}

/// Columns of the model rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySortKey {
    BrandModel,
    Total,
    DiagnosticOdometer,
    FallbackOdometer,
    FallbackOdometerPct,
    DiagnosticEngine,
    FallbackEngine,
    FallbackEnginePct,
}

impl SummarySortKey {
    pub const ALL: [Self; 8] = [
        Self::BrandModel,
        Self::Total,
        Self::DiagnosticOdometer,
        Self::FallbackOdometer,
        Self::FallbackOdometerPct,
        Self::DiagnosticEngine,
        Self::FallbackEngine,
        Self::FallbackEnginePct,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrandModel => "brand_model",
            Self::Total => "total",
            Self::DiagnosticOdometer => "diagnostic_odometer",
            Self::FallbackOdometer => "fallback_odometer",
            Self::FallbackOdometerPct => "fallback_odometer_pct",
            Self::DiagnosticEngine => "diagnostic_engine",
            Self::FallbackEngine => "fallback_engine",
            Self::FallbackEnginePct => "fallback_engine_pct",
        }
    }
}

impl fmt::Display for SummarySortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummarySortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

fn count(value: usize) -> SortValue {
    SortValue::Number(Some(value as f64))
}

impl Sortable for ModelSummary {
    type Key = SummarySortKey;

    fn sort_value(&self, key: SummarySortKey) -> SortValue {
        match key {
            SummarySortKey::BrandModel => SortValue::text(Some(self.brand_model.as_str())),
            SummarySortKey::Total => count(self.total),
            SummarySortKey::DiagnosticOdometer => count(self.diagnostic_odometer_count),
            SummarySortKey::FallbackOdometer => count(self.fallback_odometer_count),
            SummarySortKey::FallbackOdometerPct => SortValue::Number(Some(self.fallback_odometer_pct)),
            SummarySortKey::DiagnosticEngine => count(self.diagnostic_engine_count),
            SummarySortKey::FallbackEngine => count(self.fallback_engine_count),
            SummarySortKey::FallbackEnginePct => SortValue::Number(Some(self.fallback_engine_pct)),
        }
    }
}
