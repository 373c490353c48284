//! Shared cache state
//!
//! The two search caches, the dirty-key tracker and the metrics collector,
//! shared by the gateway and the maintenance tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::{BoundedTtlCache, Clock, DirtyKeyTracker, SystemClock};
use crate::config::Config;
use crate::metrics::{CacheGauges, MetricsCollector, MetricsSnapshot};
use crate::models::{Address, CachedResults};

/// Cached customer-name searches.
pub type CustomerCache = BoundedTtlCache<CachedResults<String>>;
/// Cached address searches, keyed per customer.
pub type AddressCache = BoundedTtlCache<CachedResults<Address>>;

/// State shared across the gateway and the scheduler.
///
/// Every member synchronizes internally; callers never lock around it.
#[derive(Debug)]
pub struct CacheState {
    pub customers: CustomerCache,
    pub addresses: AddressCache,
    pub dirty: DirtyKeyTracker,
    pub metrics: MetricsCollector,
    clock: Arc<dyn Clock>,
    /// Bumped by every incremental pass that has customers to invalidate
    invalidation_epoch: AtomicU64,
}

impl CacheState {
    /// Creates state sized from configuration, on the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            customers: BoundedTtlCache::new(
                "customer",
                config.max_entries_customer_cache,
                config.ttl_millis,
                Arc::clone(&clock),
            ),
            addresses: BoundedTtlCache::new(
                "address",
                config.max_entries_address_cache,
                config.ttl_millis,
                Arc::clone(&clock),
            ),
            dirty: DirtyKeyTracker::new(),
            metrics: MetricsCollector::new(),
            clock,
            invalidation_epoch: AtomicU64::new(0),
        }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    // == Invalidation Epoch ==
    /// Current invalidation epoch.
    ///
    /// A miss-path fetch reads this before going to the data source and only
    /// caches its result if the epoch is unchanged, so a result that predates
    /// an incremental pass is never stored after the pass has run.
    pub fn invalidation_epoch(&self) -> u64 {
        self.invalidation_epoch.load(Ordering::SeqCst)
    }

    /// Starts a new epoch; called before an incremental pass removes entries.
    pub fn advance_invalidation_epoch(&self) -> u64 {
        self.invalidation_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn gauges(&self) -> CacheGauges {
        CacheGauges {
            customer_cache_size: self.customers.len(),
            address_cache_size: self.addresses.len(),
            evictions: self.customers.evictions() + self.addresses.evictions(),
            expired_removals: self.customers.expired_removals()
                + self.addresses.expired_removals(),
        }
    }

    /// Metrics snapshot stamped with the state's clock.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = self.now_millis();
        let taken_at = DateTime::from_timestamp_millis(now).unwrap_or_else(Utc::now);
        self.metrics.snapshot(self.gauges(), taken_at)
    }

    /// Drops every entry from both caches; returns how many were removed.
    pub fn clear(&self) -> usize {
        self.customers.clear() + self.addresses.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    #[test]
    fn test_state_from_config() {
        let config = Config {
            max_entries_customer_cache: 10,
            max_entries_address_cache: 20,
            ..Config::default()
        };
        let state = CacheState::from_config(&config);

        assert_eq!(state.customers.max_entries(), 10);
        assert_eq!(state.addresses.max_entries(), 20);
        assert_eq!(state.customers.name(), "customer");
        assert_eq!(state.addresses.name(), "address");
    }

    #[test]
    fn test_snapshot_reads_cache_sizes() {
        let clock = Arc::new(ManualClock::new(0));
        let state = CacheState::with_clock(&Config::default(), clock);

        state
            .customers
            .put("customer:ac", CachedResults::new(vec!["ACME".to_string()], 10));
        state.metrics.record_hit();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.customer_cache_size, 1);
        assert_eq!(snapshot.address_cache_size, 0);
        assert_eq!(snapshot.hits, 1);

        assert_eq!(state.clear(), 1);
        assert_eq!(state.snapshot().customer_cache_size, 0);
    }

    #[test]
    fn test_invalidation_epoch_advances() {
        let state = CacheState::from_config(&Config::default());
        assert_eq!(state.invalidation_epoch(), 0);

        assert_eq!(state.advance_invalidation_epoch(), 1);
        assert_eq!(state.invalidation_epoch(), 1);
    }

    #[test]
    fn test_snapshot_time_follows_state_clock() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let state = CacheState::with_clock(&Config::default(), clock.clone());

        assert_eq!(state.snapshot().taken_at.timestamp_millis(), 1_700_000_000_000);

        clock.advance(2_500);
        assert_eq!(state.snapshot().taken_at.timestamp_millis(), 1_700_000_002_500);
    }
}
