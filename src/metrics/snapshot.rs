//! Metrics Snapshot Module
//!
//! Read-only, point-in-time copy of the cache counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Metrics Snapshot ==
/// Copy of the counters taken for reporting; never the live values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// When the copy was taken
    pub taken_at: DateTime<Utc>,
    /// Searches answered from cache
    pub hits: u64,
    /// Searches that went to the data source
    pub misses: u64,
    /// Full refreshes that actually ran (including manual invalidations)
    pub background_refreshes: u64,
    /// Incremental passes completed
    pub incremental_passes: u64,
    /// Full refreshes skipped under light load
    pub skipped_refreshes: u64,
    /// Miss-path fetches that failed or timed out
    pub data_source_errors: u64,
    /// Entries evicted for capacity across both caches
    pub evictions: u64,
    /// Entries dropped for age across both caches
    pub expired_removals: u64,
    /// Searches currently waiting on the data source
    pub in_flight_searches: usize,
    /// Mean duration of miss-path fetches
    pub avg_fetch_millis: f64,
    pub customer_cache_size: usize,
    pub address_cache_size: usize,
}

impl MetricsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}
