//! JSON-RPC adapter for a MyGeotab-style fleet platform.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{GeotabCredentials, GeotabProvider};
