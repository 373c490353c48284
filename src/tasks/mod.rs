//! Background Tasks Module
//!
//! Periodic maintenance that keeps the caches in step with the data source.
//!
//! # Tasks
//! - Incremental pass: invalidates entries for customers marked dirty by writes
//! - Full refresh: under load, drops recently touched entries so they re-fetch
//! - TTL sweep: removes expired entries nobody has read
//! - Metrics: logs a snapshot and threshold warnings, rolls the hit-ratio window

mod incremental;
mod refresh;
mod report;
mod scheduler;
mod sweep;

pub use incremental::{run_incremental_pass, IncrementalReport};
pub use refresh::{run_full_refresh, RefreshOutcome};
pub use report::{emit_metrics, MetricsWarning};
pub use scheduler::MaintenanceScheduler;
pub use sweep::run_sweep;
