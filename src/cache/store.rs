//! Cache Store Module
//!
//! Bounded TTL cache combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheEntry, Clock, LruTracker};

#[derive(Debug)]
struct Inner<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
}

impl<V> Inner<V> {
    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}

// == Bounded TTL Cache ==
/// Thread-safe key -> entry store with LRU eviction and TTL expiry.
///
/// All mutation happens under one short-held mutex; nothing else is ever
/// awaited or called out to while it is held. Absence is a normal outcome:
/// no operation fails on a miss.
pub struct BoundedTtlCache<V> {
    /// Label used in logs and metrics
    name: &'static str,
    inner: Mutex<Inner<V>>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Age after which reads treat an entry as absent
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
    evictions: AtomicU64,
    expired_removals: AtomicU64,
}

impl<V: Clone> BoundedTtlCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` entries, each live for `ttl_millis`.
    pub fn new(
        name: &'static str,
        max_entries: usize,
        ttl_millis: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(max_entries.min(1024)),
                lru: LruTracker::new(),
            }),
            max_entries,
            ttl_millis,
            clock,
            evictions: AtomicU64::new(0),
            expired_removals: AtomicU64::new(0),
        }
    }

    // == Get ==
    /// Returns the value if present and live, marking the key most recently used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let mut inner = self.inner.lock();

        let expired = inner.entries.get(key)?.is_expired(self.ttl_millis, now);
        if expired {
            inner.remove(key);
            self.expired_removals.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        inner.lru.touch(key, now);
        inner.entries.get(key).map(|entry| entry.value().clone())
    }

    // == Put ==
    /// Inserts or replaces the entry for `key`, stamped with the current time.
    ///
    /// If the cache grows past capacity, least recently used entries are
    /// evicted until it fits. Returns the number of evicted entries.
    pub fn put(&self, key: impl Into<String>, value: V) -> usize {
        let mut inner = self.inner.lock();
        self.insert_locked(&mut inner, key.into(), value)
    }

    // == Put If ==
    /// Like [`put`](Self::put), but only if `still_valid` holds when checked
    /// under the cache lock.
    ///
    /// A removal that runs after the check sees the new entry; one that ran
    /// before it must have made `still_valid` false. Returns whether the
    /// value was stored.
    pub fn put_if<F>(&self, key: impl Into<String>, value: V, still_valid: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let mut inner = self.inner.lock();
        if !still_valid() {
            return false;
        }
        self.insert_locked(&mut inner, key.into(), value);
        true
    }

    fn insert_locked(&self, inner: &mut Inner<V>, key: String, value: V) -> usize {
        let now = self.clock.now_millis();
        inner.lru.touch(&key, now);
        inner.entries.insert(key, CacheEntry::new(value, now));

        let mut evicted = 0;
        while inner.entries.len() > self.max_entries {
            match inner.lru.evict_oldest() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }

        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
        evicted
    }

    // == Remove Matching ==
    /// Removes every entry whose key or value satisfies `predicate`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str, &V) -> bool,
    {
        let mut inner = self.inner.lock();
        let doomed: Vec<String> = inner
            .entries
            .iter()
            .filter(|(key, entry)| predicate(key, entry.value()))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            inner.remove(key);
        }
        doomed.len()
    }

    // == Sweep Expired ==
    /// Removes all entries older than the TTL at time `now`, regardless of access order.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self, now: i64) -> usize {
        let mut inner = self.inner.lock();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl_millis, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }

        if !expired.is_empty() {
            self.expired_removals
                .fetch_add(expired.len() as u64, Ordering::Relaxed);
        }
        expired.len()
    }

    // == Remove Touched Since ==
    /// Drops every entry read or written at or after `cutoff_millis`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_touched_since(&self, cutoff_millis: i64) -> usize {
        let mut inner = self.inner.lock();
        let recent = inner.lru.touched_since(cutoff_millis);
        for key in &recent {
            inner.remove(key);
        }
        recent.len()
    }

    // == Clear ==
    /// Removes everything; returns the number of entries dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        inner.lru.clear();
        count
    }

    // == Peek ==
    /// Returns a copy of the raw entry without touching recency or checking TTL.
    pub fn peek(&self, key: &str) -> Option<CacheEntry<V>> {
        self.inner.lock().entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    /// Entries dropped to stay within capacity since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Entries dropped for age (on read or sweep) since creation.
    pub fn expired_removals(&self) -> u64 {
        self.expired_removals.load(Ordering::Relaxed)
    }
}

impl<V> fmt::Debug for BoundedTtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedTtlCache")
            .field("name", &self.name)
            .field("max_entries", &self.max_entries)
            .field("ttl_millis", &self.ttl_millis)
            .finish_non_exhaustive()
    }
}
