//! Metrics Emission Task
//!
//! Logs a metrics snapshot, warns when thresholds are crossed, and starts a
//! new hit-ratio window.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SuggestError};
use crate::metrics::MetricsSnapshot;
use crate::state::CacheState;

/// A threshold crossed during the last window.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsWarning {
    LowHitRatio { ratio: f64, lookups: u64 },
    HighOccupancy {
        cache: &'static str,
        size: usize,
        capacity: usize,
    },
}

/// Emits one metrics report and rolls the hit-ratio window.
pub fn emit_metrics(state: &CacheState, config: &Config) -> Result<(MetricsSnapshot, Vec<MetricsWarning>)> {
    let snapshot = state.snapshot();
    let (window_hits, window_misses) = state.metrics.roll_window();
    let lookups = window_hits + window_misses;

    let mut warnings = Vec::new();
    if lookups > 0 && lookups >= config.min_lookups_for_warning {
        let ratio = window_hits as f64 / lookups as f64;
        if ratio < config.hit_ratio_warn_threshold {
            warnings.push(MetricsWarning::LowHitRatio { ratio, lookups });
        }
    }

    for (cache, size, capacity) in [
        (
            state.customers.name(),
            snapshot.customer_cache_size,
            state.customers.max_entries(),
        ),
        (
            state.addresses.name(),
            snapshot.address_cache_size,
            state.addresses.max_entries(),
        ),
    ] {
        if size as f64 > capacity as f64 * config.occupancy_warn_threshold {
            warnings.push(MetricsWarning::HighOccupancy {
                cache,
                size,
                capacity,
            });
        }
    }

    let json = serde_json::to_string(&snapshot)
        .map_err(|err| SuggestError::Maintenance(format!("snapshot serialization: {}", err)))?;
    info!(
        hits = snapshot.hits,
        misses = snapshot.misses,
        hit_ratio = snapshot.hit_ratio(),
        window_lookups = lookups,
        customer_cache_size = snapshot.customer_cache_size,
        address_cache_size = snapshot.address_cache_size,
        snapshot = %json,
        "Cache metrics"
    );

    for warning in &warnings {
        match warning {
            MetricsWarning::LowHitRatio { ratio, lookups } => {
                warn!(ratio, lookups, "Cache hit ratio below threshold");
            }
            MetricsWarning::HighOccupancy {
                cache,
                size,
                capacity,
            } => {
                warn!(cache, size, capacity, "Cache occupancy above threshold");
            }
        }
    }

    Ok((snapshot, warnings))
}
