//! Metrics Module
//!
//! Atomic performance counters and the snapshots taken from them.

mod collector;
mod snapshot;

pub use collector::{CacheGauges, InFlightGuard, MetricsCollector};
pub use snapshot::MetricsSnapshot;
