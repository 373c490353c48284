//! Metrics Collector Module
//!
//! Lock-free counters for cache hits, misses, maintenance runs and fetch timing.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::metrics::MetricsSnapshot;

// == Cache Gauges ==
/// Values read from the caches themselves when a snapshot is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheGauges {
    pub customer_cache_size: usize,
    pub address_cache_size: usize,
    pub evictions: u64,
    pub expired_removals: u64,
}

// == Metrics Collector ==
/// Process-wide counters, updated through well-defined methods only.
///
/// Besides the lifetime totals, hits and misses are also counted in a
/// rolling window that the metrics task resets on each emission; the
/// full-refresh gate reads the window ratio.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    background_refreshes: AtomicU64,
    incremental_passes: AtomicU64,
    skipped_refreshes: AtomicU64,
    data_source_errors: AtomicU64,
    fetches: AtomicU64,
    fetch_micros_total: AtomicU64,
    window_hits: AtomicU64,
    window_misses: AtomicU64,
    in_flight: AtomicUsize,
}

/// Counts a search as in flight until dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    collector: &'a MetricsCollector,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.collector.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.window_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.window_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_background_refresh(&self) {
        self.background_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_incremental_pass(&self) {
        self.incremental_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_refresh(&self) {
        self.skipped_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_data_source_error(&self) {
        self.data_source_errors.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Fetch ==
    /// Accumulates the duration of one miss-path data-source call.
    pub fn record_fetch(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.fetch_micros_total.fetch_add(micros, Ordering::Relaxed);
    }

    // == Begin Search ==
    /// Marks a search as in flight for the lifetime of the returned guard.
    pub fn begin_search(&self) -> InFlightGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard { collector: self }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn window_lookups(&self) -> u64 {
        self.window_hits.load(Ordering::Relaxed) + self.window_misses.load(Ordering::Relaxed)
    }

    // == Window Hit Ratio ==
    /// Hit ratio over the current window, or None if the window saw no lookups.
    pub fn window_hit_ratio(&self) -> Option<f64> {
        let hits = self.window_hits.load(Ordering::Relaxed);
        let misses = self.window_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        (total > 0).then(|| hits as f64 / total as f64)
    }

    // == Roll Window ==
    /// Resets the window counters, returning the (hits, misses) they held.
    pub fn roll_window(&self) -> (u64, u64) {
        let hits = self.window_hits.swap(0, Ordering::Relaxed);
        let misses = self.window_misses.swap(0, Ordering::Relaxed);
        (hits, misses)
    }

    // == Snapshot ==
    /// Copies the counters; counters are read individually, not as one atomic unit.
    pub fn snapshot(&self, gauges: CacheGauges, taken_at: DateTime<Utc>) -> MetricsSnapshot {
        let fetches = self.fetches.load(Ordering::Relaxed);
        let fetch_micros = self.fetch_micros_total.load(Ordering::Relaxed);
        let avg_fetch_millis = if fetches == 0 {
            0.0
        } else {
            fetch_micros as f64 / fetches as f64 / 1_000.0
        };

        MetricsSnapshot {
            taken_at,
            hits: self.hits(),
            misses: self.misses(),
            background_refreshes: self.background_refreshes.load(Ordering::Relaxed),
            incremental_passes: self.incremental_passes.load(Ordering::Relaxed),
            skipped_refreshes: self.skipped_refreshes.load(Ordering::Relaxed),
            data_source_errors: self.data_source_errors.load(Ordering::Relaxed),
            evictions: gauges.evictions,
            expired_removals: gauges.expired_removals,
            in_flight_searches: self.in_flight(),
            avg_fetch_millis,
            customer_cache_size: gauges.customer_cache_size,
            address_cache_size: gauges.address_cache_size,
        }
    }
}
