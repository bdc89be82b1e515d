use serde::{Deserialize, Serialize};

/// Group label used for rows without a brand/model.
pub const NO_MODEL_LABEL: &str = "(no model)";

/// Source breakdown for every vehicle sharing one brand/model.
///
/// `diagnostic_*_count + fallback_*_count == total` for both odometer and
/// engine; percentages are `100 * fallback / total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub brand_model: String,
    pub total: usize,
    pub diagnostic_odometer_count: usize,
    pub fallback_odometer_count: usize,
    pub fallback_odometer_pct: f64,
    pub diagnostic_engine_count: usize,
    pub fallback_engine_count: usize,
    pub fallback_engine_pct: f64,
}

impl ModelSummary {
    /// True when the odometer fallback share strictly exceeds `threshold_pct`.
    pub fn exceeds(&self, threshold_pct: f64) -> bool {
        self.fallback_odometer_pct > threshold_pct
    }
}

/// `100 * part / total`, or 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
