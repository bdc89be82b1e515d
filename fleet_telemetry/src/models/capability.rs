use serde::{Deserialize, Serialize};

/// Capability coverage reported for one vehicle identifier.
///
/// Built up over repeated observations: [`CapabilitySupport::merge`] only
/// touches the fields the newer observation actually carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapabilitySupport {
    /// "Make Model", as reported by the capability service.
    pub brand_model: Option<String>,
    /// Percentage of support reported for the odometer diagnostic.
    pub odometer_support_pct: Option<f64>,
    /// Percentage of support reported for engine operational time.
    pub engine_hours_support_pct: Option<f64>,
}

impl CapabilitySupport {
    /// Overwrites every field that `newer` has set; leaves the rest untouched.
    pub fn merge(&mut self, newer: CapabilitySupport) {
        if newer.brand_model.is_some() {
            self.brand_model = newer.brand_model;
        }
        if newer.odometer_support_pct.is_some() {
            self.odometer_support_pct = newer.odometer_support_pct;
        }
        if newer.engine_hours_support_pct.is_some() {
            self.engine_hours_support_pct = newer.engine_hours_support_pct;
        }
    }
}
