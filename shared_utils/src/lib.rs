//! Small helpers shared by the fleet crates: environment access and
//! lenient numeric configuration parsing.

pub mod config;
pub mod env;
