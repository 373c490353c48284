//! Cache Entry Module
//!
//! Defines the unit of storage: a value stamped with its insertion time.

// == Cache Entry ==
/// A cached value plus the Unix-millisecond time it was inserted.
///
/// Entries are never mutated after construction; an update replaces the
/// whole entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    value: T,
    inserted_at_millis: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    pub fn new(value: T, inserted_at_millis: i64) -> Self {
        Self {
            value,
            inserted_at_millis,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn inserted_at_millis(&self) -> i64 {
        self.inserted_at_millis
    }

    // == Age ==
    /// Milliseconds elapsed since insertion, clamped at zero if the clock moved back.
    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.inserted_at_millis).max(0)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl_millis` at time `now`.
    ///
    /// Boundary condition: an entry whose age is exactly the TTL is still
    /// live; it expires once the age strictly exceeds the TTL.
    pub fn is_expired(&self, ttl_millis: i64, now: i64) -> bool {
        self.age_millis(now) > ttl_millis
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
