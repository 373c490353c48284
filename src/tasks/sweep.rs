//! TTL Sweep Task
//!
//! Removes expired entries nobody has read since they aged out.

use tracing::{debug, info};

use crate::state::CacheState;

/// Sweeps both caches once; returns the number of entries removed.
pub fn run_sweep(state: &CacheState) -> usize {
    let now = state.now_millis();
    let customers = state.customers.sweep_expired(now);
    let addresses = state.addresses.sweep_expired(now);
    let removed = customers + addresses;

    if removed > 0 {
        info!(customers, addresses, "TTL sweep: removed {} expired entries", removed);
    } else {
        debug!("TTL sweep: no expired entries found");
    }
    removed
}
