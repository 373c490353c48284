//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SuggestError};

/// Suggestion cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of cached customer searches
    pub max_entries_customer_cache: usize,
    /// Maximum number of cached address searches
    pub max_entries_address_cache: usize,
    /// Age in milliseconds after which an entry reads as a miss
    pub ttl_millis: i64,
    /// Address results larger than this are returned but not cached
    pub per_customer_address_cache_cap: usize,
    /// Period of the dirty-key reconciliation pass
    pub incremental_pass_interval_millis: u64,
    /// Period of the conditional full refresh
    pub full_refresh_interval_millis: u64,
    /// Period of the expired-entry sweep
    pub sweep_interval_millis: u64,
    /// Period of metrics emission (also the hit-ratio window length)
    pub metrics_interval_millis: u64,
    /// Full refresh is skipped above this window hit ratio when idle
    pub hit_ratio_skip_threshold: f64,
    /// Entries touched within this window are dropped by a full refresh
    pub refresh_recent_window_millis: i64,
    /// Metrics emission warns below this window hit ratio
    pub hit_ratio_warn_threshold: f64,
    /// Metrics emission warns above this fraction of cache capacity
    pub occupancy_warn_threshold: f64,
    /// Minimum window lookups before the hit-ratio warning fires
    pub min_lookups_for_warning: u64,
    /// Concurrent data-source calls allowed for searches and writes
    pub search_workers: usize,
    /// Miss-path fetches slower than this degrade to an empty result
    pub data_source_timeout_millis: u64,
    /// How long shutdown waits for in-flight work before cancelling it
    pub shutdown_grace_millis: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES_CUSTOMER_CACHE` (default: 1000)
    /// - `MAX_ENTRIES_ADDRESS_CACHE` (default: 2000)
    /// - `TTL_MILLIS` (default: 300000)
    /// - `PER_CUSTOMER_ADDRESS_CACHE_CAP` (default: 500)
    /// - `INCREMENTAL_PASS_INTERVAL_MILLIS` (default: 30000)
    /// - `FULL_REFRESH_INTERVAL_MILLIS` (default: 180000)
    /// - `SWEEP_INTERVAL_MILLIS` (default: 60000)
    /// - `METRICS_INTERVAL_MILLIS` (default: 300000)
    /// - `HIT_RATIO_SKIP_THRESHOLD` (default: 0.8)
    /// - `REFRESH_RECENT_WINDOW_MILLIS` (default: 60000)
    /// - `HIT_RATIO_WARN_THRESHOLD` (default: 0.5)
    /// - `OCCUPANCY_WARN_THRESHOLD` (default: 0.9)
    /// - `MIN_LOOKUPS_FOR_WARNING` (default: 20)
    /// - `SEARCH_WORKERS` (default: 4)
    /// - `DATA_SOURCE_TIMEOUT_MILLIS` (default: 5000)
    /// - `SHUTDOWN_GRACE_MILLIS` (default: 5000)
    ///
    /// Unparseable values fall back to their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries_customer_cache: env_or(
                "MAX_ENTRIES_CUSTOMER_CACHE",
                defaults.max_entries_customer_cache,
            ),
            max_entries_address_cache: env_or(
                "MAX_ENTRIES_ADDRESS_CACHE",
                defaults.max_entries_address_cache,
            ),
            ttl_millis: env_or("TTL_MILLIS", defaults.ttl_millis),
            per_customer_address_cache_cap: env_or(
                "PER_CUSTOMER_ADDRESS_CACHE_CAP",
                defaults.per_customer_address_cache_cap,
            ),
            incremental_pass_interval_millis: env_or(
                "INCREMENTAL_PASS_INTERVAL_MILLIS",
                defaults.incremental_pass_interval_millis,
            ),
            full_refresh_interval_millis: env_or(
                "FULL_REFRESH_INTERVAL_MILLIS",
                defaults.full_refresh_interval_millis,
            ),
            sweep_interval_millis: env_or("SWEEP_INTERVAL_MILLIS", defaults.sweep_interval_millis),
            metrics_interval_millis: env_or(
                "METRICS_INTERVAL_MILLIS",
                defaults.metrics_interval_millis,
            ),
            hit_ratio_skip_threshold: env_or(
                "HIT_RATIO_SKIP_THRESHOLD",
                defaults.hit_ratio_skip_threshold,
            ),
            refresh_recent_window_millis: env_or(
                "REFRESH_RECENT_WINDOW_MILLIS",
                defaults.refresh_recent_window_millis,
            ),
            hit_ratio_warn_threshold: env_or(
                "HIT_RATIO_WARN_THRESHOLD",
                defaults.hit_ratio_warn_threshold,
            ),
            occupancy_warn_threshold: env_or(
                "OCCUPANCY_WARN_THRESHOLD",
                defaults.occupancy_warn_threshold,
            ),
            min_lookups_for_warning: env_or(
                "MIN_LOOKUPS_FOR_WARNING",
                defaults.min_lookups_for_warning,
            ),
            search_workers: env_or("SEARCH_WORKERS", defaults.search_workers),
            data_source_timeout_millis: env_or(
                "DATA_SOURCE_TIMEOUT_MILLIS",
                defaults.data_source_timeout_millis,
            ),
            shutdown_grace_millis: env_or("SHUTDOWN_GRACE_MILLIS", defaults.shutdown_grace_millis),
        }
    }

    // == Validate ==
    /// Rejects values the caches and scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_entries_customer_cache", self.max_entries_customer_cache as u64),
            ("max_entries_address_cache", self.max_entries_address_cache as u64),
            (
                "per_customer_address_cache_cap",
                self.per_customer_address_cache_cap as u64,
            ),
            (
                "incremental_pass_interval_millis",
                self.incremental_pass_interval_millis,
            ),
            ("full_refresh_interval_millis", self.full_refresh_interval_millis),
            ("sweep_interval_millis", self.sweep_interval_millis),
            ("metrics_interval_millis", self.metrics_interval_millis),
            ("search_workers", self.search_workers as u64),
            ("data_source_timeout_millis", self.data_source_timeout_millis),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(SuggestError::Config(format!("{} must be greater than 0", name)));
            }
        }

        if self.ttl_millis <= 0 {
            return Err(SuggestError::Config(
                "ttl_millis must be greater than 0".to_string(),
            ));
        }
        if self.refresh_recent_window_millis < 0 {
            return Err(SuggestError::Config(
                "refresh_recent_window_millis must not be negative".to_string(),
            ));
        }

        let ratios = [
            ("hit_ratio_skip_threshold", self.hit_ratio_skip_threshold),
            ("hit_ratio_warn_threshold", self.hit_ratio_warn_threshold),
            ("occupancy_warn_threshold", self.occupancy_warn_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(SuggestError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    pub fn incremental_pass_interval(&self) -> Duration {
        Duration::from_millis(self.incremental_pass_interval_millis)
    }

    pub fn full_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.full_refresh_interval_millis)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_millis)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_millis)
    }

    pub fn data_source_timeout(&self) -> Duration {
        Duration::from_millis(self.data_source_timeout_millis)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries_customer_cache: 1000,
            max_entries_address_cache: 2000,
            ttl_millis: 300_000,
            per_customer_address_cache_cap: 500,
            incremental_pass_interval_millis: 30_000,
            full_refresh_interval_millis: 180_000,
            sweep_interval_millis: 60_000,
            metrics_interval_millis: 300_000,
            hit_ratio_skip_threshold: 0.8,
            refresh_recent_window_millis: 60_000,
            hit_ratio_warn_threshold: 0.5,
            occupancy_warn_threshold: 0.9,
            min_lookups_for_warning: 20,
            search_workers: 4,
            data_source_timeout_millis: 5_000,
            shutdown_grace_millis: 5_000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries_customer_cache, 1000);
        assert_eq!(config.max_entries_address_cache, 2000);
        assert_eq!(config.ttl_millis, 300_000);
        assert_eq!(config.per_customer_address_cache_cap, 500);
        assert_eq!(config.incremental_pass_interval_millis, 30_000);
        assert_eq!(config.full_refresh_interval_millis, 180_000);
        assert_eq!(config.sweep_interval_millis, 60_000);
        assert_eq!(config.hit_ratio_skip_threshold, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Only touches variables no other test reads
        env::set_var("PER_CUSTOMER_ADDRESS_CACHE_CAP", "42");
        env::set_var("SEARCH_WORKERS", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.per_customer_address_cache_cap, 42);
        assert_eq!(config.search_workers, 4);

        env::remove_var("PER_CUSTOMER_ADDRESS_CACHE_CAP");
        env::remove_var("SEARCH_WORKERS");
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = Config {
            max_entries_address_cache: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(SuggestError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_ratio() {
        let config = Config {
            hit_ratio_skip_threshold: 1.5,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(SuggestError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_ttl() {
        let config = Config {
            ttl_millis: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.incremental_pass_interval(), Duration::from_secs(30));
        assert_eq!(config.full_refresh_interval(), Duration::from_secs(180));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
    }
}
