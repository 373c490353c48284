//! Cache Module
//!
//! Provides the bounded TTL cache, its LRU bookkeeping, and the dirty-key
//! tracker used for incremental invalidation.

mod clock;
mod dirty;
mod entry;
mod lru;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use dirty::{DirtyKeyTracker, DrainedKeys};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use store::BoundedTtlCache;
