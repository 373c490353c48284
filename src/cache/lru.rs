//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy)]
struct Slot {
    tick: u64,
    touched_at_millis: i64,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch stamps the key with a fresh, strictly increasing tick:
/// - lowest tick = least recently used
/// - highest tick = most recently used
///
/// Touch, remove and eviction are O(log n).
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Current slot of each tracked key
    slots: HashMap<String, Slot>,
    /// Keys ordered by access tick
    order: BTreeMap<u64, String>,
    next_tick: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used at `now_millis`.
    pub fn touch(&mut self, key: &str, now_millis: i64) {
        let tick = self.next_tick;
        self.next_tick += 1;

        let slot = Slot {
            tick,
            touched_at_millis: now_millis,
        };
        match self.slots.get_mut(key) {
            Some(existing) => {
                self.order.remove(&existing.tick);
                *existing = slot;
            }
            None => {
                self.slots.insert(key.to_string(), slot);
            }
        }
        self.order.insert(tick, key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(slot) = self.slots.remove(key) {
            self.order.remove(&slot.tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.slots.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.values().next()
    }

    // == Touched Since ==
    /// Keys touched at or after `cutoff_millis`, most recent first.
    ///
    /// Walks from the most recent end and stops at the first key older than
    /// the cutoff, so the cost is proportional to the result.
    pub fn touched_since(&self, cutoff_millis: i64) -> Vec<String> {
        self.order
            .values()
            .rev()
            .map_while(|key| {
                let slot = self.slots.get(key)?;
                (slot.touched_at_millis >= cutoff_millis).then(|| key.clone())
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }
}
