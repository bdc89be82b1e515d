//! Source abstractions for fleet telemetry.
//!
//! Two seams separate the reconciliation engine from the outside world:
//!
//! - [`TelemetrySource`]: devices, time-series readings and last known
//!   status, as served by the fleet platform.
//! - [`CapabilityService`]: per-VIN capability coverage, looked up in batches.
//!
//! Concrete implementations live in [`geotab_rest`] and [`myadmin_rest`].
//! Both traits are async and object safe, so callers can hold a
//! `Box<dyn TelemetrySource + Send + Sync>` picked at runtime, and tests can
//! substitute in-memory fakes.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use fleet_telemetry::models::{
//!     device::{Device, StatusInfo},
//!     reading::{ReadingPage, ReadingQuery},
//! };
//! use fleet_telemetry::providers::{ProviderError, TelemetrySource};
//!
//! struct EmptyFleet;
//!
//! #[async_trait]
//! impl TelemetrySource for EmptyFleet {
//!     async fn list_devices(&self) -> Result<Vec<Device>, ProviderError> {
//!         Ok(vec![])
//!     }
//!     async fn query_readings(&self, _query: &ReadingQuery) -> Result<ReadingPage, ProviderError> {
//!         Ok(ReadingPage::default())
//!     }
//!     async fn list_status_info(&self) -> Result<Vec<StatusInfo>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod geotab_rest;
pub(crate) mod lenient;
pub mod myadmin_rest;

use async_trait::async_trait;
use secrecy::SecretString;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{
    capability::CapabilitySupport,
    device::{Device, StatusInfo},
    identifier::Vin,
    reading::{ReadingPage, ReadingQuery},
};

/// Read access to the fleet platform.
#[async_trait]
pub trait TelemetrySource {
    /// Lists every device in the fleet. No pagination beyond a generous cap.
    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError>;

    /// Fetches one page of readings for `query`.
    ///
    /// When `query.sort` is ascending, rows must come back in ascending
    /// timestamp order; the window scanner relies on it.
    async fn query_readings(&self, query: &ReadingQuery) -> Result<ReadingPage, ProviderError>;

    /// Lists the last known status record per device.
    async fn list_status_info(&self) -> Result<Vec<StatusInfo>, ProviderError>;
}

/// One vehicle's capability data, already folded from the service's response
/// shape into a typed record.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportObservation {
    pub vin: Vin,
    pub support: CapabilitySupport,
}

/// Batch lookup of capability coverage by VIN.
#[async_trait]
pub trait CapabilityService {
    /// Looks up one batch of VINs in `region`.
    ///
    /// Observations come back in response order; the caller merges them
    /// last-write-wins.
    async fn lookup(
        &self,
        vins: &[Vin],
        region: u32,
        credential: &SecretString,
    ) -> Result<Vec<SupportObservation>, CapabilityError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors from a [`TelemetrySource`]. Always fatal to the current pass.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The platform answered with an error object (e.g., expired session).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The response envelope itself could not be understood.
    #[snafu(display("Unexpected response: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors from a [`CapabilityService`]. Fatal to the pass once a credential
/// was supplied and a batch started.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CapabilityError {
    /// The service answered with a non-success status.
    #[snafu(display("Capability lookup failed with status {status}: {body}"))]
    Status {
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The request never produced a usable response.
    #[snafu(display("Capability request failed: {source}"))]
    Transport {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The response body is not JSON.
    #[snafu(display("Capability response is not valid JSON: {source}"))]
    Payload {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}
