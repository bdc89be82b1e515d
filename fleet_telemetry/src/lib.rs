//! Fleet telemetry reconciliation.
//!
//! A [`ReconcilePass`](reconcile::ReconcilePass) pulls devices, status and
//! diagnostic readings from a [`TelemetrySource`](providers::TelemetrySource),
//! joins them with per-VIN capability coverage from a
//! [`CapabilityService`](providers::CapabilityService), and produces one
//! [`VehicleRow`](models::row::VehicleRow) per device. The [`views`] module
//! sorts, filters and rolls those rows up; [`io`] exports them.

pub mod cancel;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
pub mod reconcile;
pub mod requests;
pub mod views;

pub use cancel::{CancelHandle, CancelSignal};
pub use errors::Error;
