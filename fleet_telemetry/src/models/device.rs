use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked vehicle as listed by the telemetry platform.
///
/// This is the source of truth for vehicle identity. It is never modified by
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Device {
    /// Opaque platform-assigned id, distinct from the VIN.
    pub id: String,

    /// Display name. Falls back to `id` when missing.
    pub name: Option<String>,

    /// Raw, un-normalized vehicle identification number.
    pub vin: Option<String>,

    /// Odometer snapshot stored on the device record. The unit depends on the
    /// hardware generation (meters or kilometers).
    pub raw_odometer: Option<f64>,

    /// When the device was first activated.
    pub active_from: Option<DateTime<Utc>>,
}

impl Device {
    /// The label shown for this device: its name, or its id when unnamed.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// Last known status record for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub entity_id: String,
    pub timestamp: Option<DateTime<Utc>>,
}
