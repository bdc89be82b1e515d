//! Sorted, filtered and grouped views over a reconciled row set.
//!
//! Each view keeps its own [`SortState`]: the odometer list, the engine list
//! and the model rollup sort independently, and the odometer and engine lists
//! filter independently.

pub mod filter;
pub mod format;
pub mod rollup;
pub mod sort;

pub use filter::{EngineFilter, OdometerFilter, RowFilter, SourceFilter, engine_view, odometer_view};
pub use rollup::{DEFAULT_ALERT_THRESHOLD_PCT, FlaggedSummary, rollup_view, summarize};
pub use sort::{RowSortKey, SortDirection, SortState, SummarySortKey};
