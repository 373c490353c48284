//! Conditional Full Refresh Task
//!
//! Under real load, drops the recently touched part of each cache so the
//! next reads re-fetch fresh data. Skipped when the window hit ratio is high
//! and nothing is being searched.

use tracing::{debug, info};

use crate::state::CacheState;

/// Result of one full-refresh tick.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Light load; nothing dropped
    Skipped { hit_ratio: Option<f64> },
    /// Entries touched at or after `cutoff_millis` were dropped
    Refreshed { removed: usize, cutoff_millis: i64 },
}

/// Runs one full-refresh decision over both caches.
///
/// A window with no lookups at all counts as light load.
pub fn run_full_refresh(
    state: &CacheState,
    skip_threshold: f64,
    recent_window_millis: i64,
) -> RefreshOutcome {
    let hit_ratio = state.metrics.window_hit_ratio();
    let in_flight = state.metrics.in_flight();

    let light_load = in_flight == 0 && hit_ratio.map_or(true, |ratio| ratio > skip_threshold);
    if light_load {
        state.metrics.record_skipped_refresh();
        debug!(?hit_ratio, "Full refresh skipped under light load");
        return RefreshOutcome::Skipped { hit_ratio };
    }

    let cutoff_millis = state.now_millis() - recent_window_millis;
    let removed = state.customers.remove_touched_since(cutoff_millis)
        + state.addresses.remove_touched_since(cutoff_millis);
    state.metrics.record_background_refresh();

    info!(
        removed,
        ?hit_ratio,
        in_flight,
        "Full refresh dropped recently touched entries"
    );
    RefreshOutcome::Refreshed {
        removed,
        cutoff_millis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::Config;
    use crate::gateway::keys;
    use crate::models::CachedResults;
    use std::sync::Arc;

    fn state_at(clock: &Arc<ManualClock>) -> CacheState {
        CacheState::with_clock(&Config::default(), clock.clone())
    }

    fn names() -> CachedResults<String> {
        CachedResults::new(vec!["ACME".to_string()], 10)
    }

    #[test]
    fn test_skips_without_lookups() {
        let clock = Arc::new(ManualClock::new(0));
        let state = state_at(&clock);
        state.customers.put("customer:a", names());

        let outcome = run_full_refresh(&state, 0.8, 60_000);

        assert_eq!(outcome, RefreshOutcome::Skipped { hit_ratio: None });
        assert_eq!(state.customers.len(), 1);
        assert_eq!(state.snapshot().skipped_refreshes, 1);
    }

    #[test]
    fn test_skips_when_hit_ratio_high_and_idle() {
        let clock = Arc::new(ManualClock::new(0));
        let state = state_at(&clock);
        for _ in 0..9 {
            state.metrics.record_hit();
        }
        state.metrics.record_miss();

        let outcome = run_full_refresh(&state, 0.8, 60_000);
        assert_eq!(outcome, RefreshOutcome::Skipped { hit_ratio: Some(0.9) });
        assert_eq!(state.snapshot().background_refreshes, 0);
    }

    #[test]
    fn test_low_hit_ratio_drops_only_recent_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let state = state_at(&clock);
        state.customers.put("customer:old", names());
        clock.set(100_000);
        state.customers.put("customer:recent", names());
        state.addresses.put(keys::address_key("acme", "main"), CachedResults::new(Vec::new(), 10));
        state.metrics.record_miss();

        let outcome = run_full_refresh(&state, 0.8, 60_000);

        assert_eq!(
            outcome,
            RefreshOutcome::Refreshed {
                removed: 2,
                cutoff_millis: 40_000
            }
        );
        assert!(state.customers.contains_key("customer:old"));
        assert!(!state.customers.contains_key("customer:recent"));
        assert!(state.addresses.is_empty());
        assert_eq!(state.snapshot().background_refreshes, 1);
    }

    #[test]
    fn test_in_flight_searches_force_refresh() {
        let clock = Arc::new(ManualClock::new(0));
        let state = state_at(&clock);
        for _ in 0..10 {
            state.metrics.record_hit();
        }

        let _searching = state.metrics.begin_search();
        let outcome = run_full_refresh(&state, 0.8, 60_000);

        assert!(matches!(outcome, RefreshOutcome::Refreshed { .. }));
    }
}
