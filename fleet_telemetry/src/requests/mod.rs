//! Request loops against the telemetry source and the capability service.
//!
//! Every function here runs its requests strictly one after another and
//! checks the [`CancelSignal`](crate::cancel::CancelSignal) before each one.

mod capability_batch;
pub use capability_batch::{BATCH_SIZE, clean_credential, fetch_support};

mod point_fetch;
pub use point_fetch::point_per_entity;

mod window_scan;
pub use window_scan::{PAGE_SIZE, WindowScan, latest_per_entity};

use std::collections::HashMap;

use crate::models::reading::Reading;

/// Readings keyed by entity id.
pub type ReadingsByEntity = HashMap<String, Reading>;
