//! Dirty-Key Tracker Module
//!
//! Records which customers changed since the last incremental pass.

use std::collections::HashSet;
use std::mem;

use parking_lot::Mutex;

// == Dirty Key Tracker ==
/// Thread-safe set of customer keys awaiting cache reconciliation.
///
/// `drain` swaps the set out under the same lock `mark_dirty` takes, so a
/// concurrent mark lands either in the drained set or in the next one.
#[derive(Debug, Default)]
pub struct DirtyKeyTracker {
    keys: Mutex<HashSet<String>>,
}

impl DirtyKeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Mark Dirty ==
    /// Idempotently records `customer_key` as changed.
    ///
    /// Returns `true` if the key was not already pending.
    pub fn mark_dirty(&self, customer_key: impl Into<String>) -> bool {
        self.keys.lock().insert(customer_key.into())
    }

    // == Drain ==
    /// Atomically returns and clears the pending keys.
    pub fn drain(&self) -> HashSet<String> {
        mem::take(&mut *self.keys.lock())
    }

    // == Drain Pending ==
    /// Like [`drain`](Self::drain), but the keys go back into the tracker
    /// unless [`DrainedKeys::commit`] is called, e.g. when the pass working
    /// through them panics.
    pub fn drain_pending(&self) -> DrainedKeys<'_> {
        DrainedKeys {
            tracker: self,
            keys: self.drain(),
            committed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}

/// Keys taken out of a [`DirtyKeyTracker`], restored on drop unless committed.
#[derive(Debug)]
pub struct DrainedKeys<'a> {
    tracker: &'a DirtyKeyTracker,
    keys: HashSet<String>,
    committed: bool,
}

impl DrainedKeys<'_> {
    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Marks the keys as handled.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for DrainedKeys<'_> {
    fn drop(&mut self) {
        if self.committed || self.keys.is_empty() {
            return;
        }
        let mut pending = self.tracker.keys.lock();
        pending.extend(mem::take(&mut self.keys));
    }
}
