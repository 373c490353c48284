//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a simple reference model.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{BoundedTtlCache, Clock, DirtyKeyTracker, ManualClock};

// == Test Configuration ==
const TEST_TTL_MILLIS: i64 = 1_000;

// == Strategies ==
/// Small key space so sequences revisit keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: String },
    Get { key: String },
    Advance { millis: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => (0i64..400).prop_map(|millis| CacheOp::Advance { millis }),
    ]
}

fn new_cache(max_entries: usize) -> (BoundedTtlCache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let cache = BoundedTtlCache::new("prop", max_entries, TEST_TTL_MILLIS, clock.clone());
    (cache, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of puts, size never exceeds max_entries.
    #[test]
    fn prop_capacity_enforcement(
        max_entries in 1usize..20,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200)
    ) {
        let (cache, _) = new_cache(max_entries);

        for (key, value) in entries {
            cache.put(key, value);
            prop_assert!(
                cache.len() <= max_entries,
                "Cache size {} exceeds max {}",
                cache.len(),
                max_entries
            );
        }
    }

    // With a cache at capacity, inserting one new key evicts exactly the
    // least recently read or written key.
    #[test]
    fn prop_lru_evicts_least_recent(
        max_entries in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let (cache, _clock) = new_cache(max_entries);
        // Reference model: keys ordered oldest -> newest
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    let expected_victim = if !model.contains(&key) && model.len() == max_entries {
                        Some(model[0].clone())
                    } else {
                        None
                    };

                    model.retain(|k| k != &key);
                    model.push(key.clone());
                    let evicted = cache.put(key, value);

                    match expected_victim {
                        Some(victim) => {
                            prop_assert_eq!(evicted, 1);
                            prop_assert!(!cache.contains_key(&victim), "expected {} evicted", victim);
                            model.retain(|k| k != &victim);
                        }
                        None => prop_assert_eq!(evicted, 0),
                    }
                }
                CacheOp::Get { key } => {
                    if cache.get(&key).is_some() {
                        model.retain(|k| k != &key);
                        model.push(key);
                    } else {
                        model.retain(|k| k != &key);
                    }
                }
                // Time stays put so this property sees only LRU effects
                CacheOp::Advance { .. } => {}
            }

            let stored: HashSet<String> = cache.keys().into_iter().collect();
            let modeled: HashSet<String> = model.iter().cloned().collect();
            prop_assert_eq!(stored, modeled);
        }
    }

    // A get never returns an entry older than the TTL, whether or not a
    // sweep has run.
    #[test]
    fn prop_ttl_reads_never_return_stale(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let (cache, clock) = new_cache(64);
        let mut inserted_at = std::collections::HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    inserted_at.insert(key.clone(), clock.now_millis());
                    cache.put(key, value);
                }
                CacheOp::Get { key } => {
                    let now = clock.now_millis();
                    if cache.get(&key).is_some() {
                        let at = inserted_at[&key];
                        prop_assert!(now - at <= TEST_TTL_MILLIS);
                    }
                }
                CacheOp::Advance { millis } => clock.advance(millis),
            }
        }
    }

    // Draining twice without marks yields an empty second set, and every
    // marked key shows up in the first.
    #[test]
    fn prop_drain_returns_every_mark_once(keys in prop::collection::vec(key_strategy(), 0..50)) {
        let tracker = DirtyKeyTracker::new();
        for key in &keys {
            tracker.mark_dirty(key.clone());
        }

        let drained = tracker.drain();
        let expected: HashSet<String> = keys.into_iter().collect();
        prop_assert_eq!(drained, expected);
        prop_assert!(tracker.drain().is_empty());
    }
}
