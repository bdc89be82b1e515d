use thiserror::Error;

use crate::{
    io::sink::SinkError,
    providers::{CapabilityError, ProviderError},
};

/// The unified error type for the `fleet_telemetry` crate.
///
/// A reconciliation pass is all-or-nothing: any of these aborts it without
/// producing rows.
#[derive(Debug, Error)]
pub enum Error {
    /// The device, time-series or status source failed.
    #[error("Telemetry source error: {0}")]
    Transport(#[from] ProviderError),

    /// The capability service rejected a batch or could not be reached.
    #[error("Capability service error: {0}")]
    CapabilityService(#[from] CapabilityError),

    /// An error originating from a data sink (e.g., file I/O).
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// The lookback reaches past the earliest representable instant.
    #[error("Lookback of {days} days is out of range")]
    WindowOutOfRange { days: u32 },

    /// A newer request superseded this pass.
    #[error("Reconciliation pass cancelled")]
    Cancelled,
}
