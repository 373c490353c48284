//! Incremental Invalidation Task
//!
//! Drains the dirty-key tracker and removes only the cache entries that
//! involve the changed customers.

use tracing::{debug, info};

use crate::gateway::keys;
use crate::state::CacheState;

/// What one incremental pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncrementalReport {
    pub dirty_customers: usize,
    pub customer_entries_removed: usize,
    pub address_entries_removed: usize,
}

/// Runs one incremental pass over both caches.
///
/// The drained customers go back into the tracker if the pass does not
/// finish, so the next tick retries them.
pub fn run_incremental_pass(state: &CacheState) -> IncrementalReport {
    let dirty = state.dirty.drain_pending();
    let mut report = IncrementalReport {
        dirty_customers: dirty.len(),
        ..IncrementalReport::default()
    };

    if !dirty.is_empty() {
        // Fetches already in flight must not cache what they read before the write
        state.advance_invalidation_epoch();
    }

    for customer in dirty.keys() {
        report.customer_entries_removed += state
            .customers
            .remove_matching(|key, value| keys::customer_entry_references(customer, key, value));
        report.address_entries_removed += state
            .addresses
            .remove_matching(|key, _| keys::address_entry_references(customer, key));
    }
    dirty.commit();

    state.metrics.record_incremental_pass();

    if report.dirty_customers > 0 {
        info!(
            dirty_customers = report.dirty_customers,
            customer_entries = report.customer_entries_removed,
            address_entries = report.address_entries_removed,
            "Incremental pass invalidated entries"
        );
    } else {
        debug!("Incremental pass: no dirty customers");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Address, CachedResults};

    fn names(items: &[&str]) -> CachedResults<String> {
        CachedResults::new(items.iter().map(|s| s.to_string()).collect(), 10)
    }

    fn addresses(street: &str) -> CachedResults<Address> {
        CachedResults::new(vec![Address::new("", street, "", "", "")], 10)
    }

    fn populated_state() -> CacheState {
        let state = CacheState::from_config(&Config::default());
        state.customers.put("customer:ac", names(&["ACME"]));
        state.customers.put("customer:zeta", names(&["Zeta Corp"]));
        state.customers.put("customer:coa", names(&["Zeta Corp", "Coastal"]));
        state.addresses.put(keys::address_key("acme", "main"), addresses("1 Main St"));
        state.addresses.put(keys::address_key("zeta corp", "main"), addresses("2 Main St"));
        state
    }

    #[test]
    fn test_pass_only_removes_entries_for_dirty_customer() {
        let state = populated_state();
        let untouched_customer = state.customers.peek("customer:zeta").unwrap();
        let untouched_coastal = state.customers.peek("customer:coa").unwrap();
        let untouched_address = state.addresses.peek(&keys::address_key("zeta corp", "main")).unwrap();

        state.dirty.mark_dirty("acme");
        let report = run_incremental_pass(&state);

        assert_eq!(report.dirty_customers, 1);
        assert_eq!(report.customer_entries_removed, 1);
        assert_eq!(report.address_entries_removed, 1);
        assert!(!state.customers.contains_key("customer:ac"));
        assert!(!state.addresses.contains_key(&keys::address_key("acme", "main")));

        // Survivors are exactly what they were, timestamps included
        assert_eq!(state.customers.peek("customer:zeta").unwrap(), untouched_customer);
        assert_eq!(state.customers.peek("customer:coa").unwrap(), untouched_coastal);
        assert_eq!(
            state.addresses.peek(&keys::address_key("zeta corp", "main")).unwrap(),
            untouched_address
        );
    }

    #[test]
    fn test_new_customer_invalidates_searches_it_would_match() {
        let state = populated_state();
        state.customers.put("customer:new", names(&[]));

        state.dirty.mark_dirty("newco");
        let report = run_incremental_pass(&state);

        assert_eq!(report.customer_entries_removed, 1);
        assert!(!state.customers.contains_key("customer:new"));
        assert_eq!(state.customers.len(), 3);
    }

    #[test]
    fn test_customer_name_with_colon_is_not_collateral() {
        let state = populated_state();
        let west = keys::address_key("acme:west", "main");
        state.addresses.put(west.clone(), addresses("9 West St"));

        state.dirty.mark_dirty("acme");
        let report = run_incremental_pass(&state);

        assert_eq!(report.address_entries_removed, 1);
        assert!(state.addresses.contains_key(&west));
    }

    #[test]
    fn test_pass_advances_epoch_only_with_dirty_customers() {
        let state = populated_state();

        run_incremental_pass(&state);
        assert_eq!(state.invalidation_epoch(), 0);

        state.dirty.mark_dirty("acme");
        run_incremental_pass(&state);
        assert_eq!(state.invalidation_epoch(), 1);
        assert!(state.dirty.is_empty());
    }

    #[test]
    fn test_pass_drains_tracker_and_counts() {
        let state = populated_state();
        state.dirty.mark_dirty("acme");

        run_incremental_pass(&state);
        let second = run_incremental_pass(&state);

        assert_eq!(second, IncrementalReport::default());
        assert!(state.dirty.is_empty());
        assert_eq!(state.snapshot().incremental_passes, 2);
    }
}
