// ==============================================
// CHAINED POLICY TESTS (integration)
// ==============================================
//
// Behavior of multi-layer chains driven through the public cache API:
// eviction propagation, TTL timing with a manual clock, per-insert overrides,
// and recovery from a store that loses writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chaincache::prelude::*;

const MAX_AGE: Duration = Duration::from_millis(100);

type ManualTtl = TtlPolicy<u32, NoPolicy, ManualClock>;

fn manual_ttl(clock: &ManualClock) -> ManualTtl {
    TtlPolicy::with_clock(MAX_AGE, clock.clone())
}

// ==============================================
// Eviction Propagation
// ==============================================

mod propagation {
    use super::*;

    #[test]
    fn lru_over_ttl_forgets_victims_in_both_layers() {
        let clock = ManualClock::new();
        let cache = Cache::new(LruPolicy::with_inner(2, manual_ttl(&clock)));
        cache.insert(1, "a");
        cache.insert(2, "b");
        assert_eq!(cache.get(&1), Ok("a"));

        cache.insert(3, "c");
        assert!(!cache.contains(&2));
        cache.with_policy(|lru| {
            assert_eq!(lru.len(), 2);
            assert_eq!(lru.inner().len(), 2);
            assert!(!lru.inner().contains(&2));
        });
        cache.check_invariants().unwrap();
    }

    #[test]
    fn inner_victim_disappears_from_outer_layers() {
        let clock = ManualClock::new();
        let chain = LruPolicy::with_inner(3, FifoPolicy::with_inner(2, manual_ttl(&clock)));
        let cache = Cache::new(chain);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        // the fifo layer is tighter than the lru layer above it
        assert!(!cache.contains(&1));
        let sizes = cache.with_policy(|lru| {
            (lru.len(), lru.inner().len(), lru.inner().inner().len())
        });
        assert_eq!(sizes, (2, 2, 2));
        assert_eq!(cache.with_policy(|lru| lru.layer_lens()), vec![2, 2, 2]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn remove_and_clear_reach_every_layer() {
        let clock = ManualClock::new();
        let cache = Cache::new(LfuPolicy::with_inner(4, manual_ttl(&clock)));
        for k in 0..4 {
            cache.insert(k, k * 10);
        }
        assert_eq!(cache.remove(&2), Some(20));
        assert!(!cache.with_policy(|lfu| lfu.inner().contains(&2)));

        cache.clear();
        cache.with_policy(|lfu| {
            assert!(lfu.is_empty());
            assert!(lfu.inner().is_empty());
        });
    }

    #[test]
    fn random_layer_drops_exactly_one_old_key() {
        let cache = Cache::new(RandomPolicy::with_seed(2, 11));
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");

        assert!(cache.contains(&3));
        assert!(cache.contains(&1) ^ cache.contains(&2));
        assert_eq!(cache.len(), 2);
    }
}

// ==============================================
// TTL Timing
// ==============================================

mod ttl_timing {
    use super::*;

    #[test]
    fn fifo_over_ttl_frees_slots_on_expiry() {
        let clock = ManualClock::new();
        let cache = Cache::new(FifoPolicy::with_inner(3, manual_ttl(&clock)));
        let short = InsertOptions::new().with_ttl(Duration::from_millis(50));
        cache.insert_with(1, "a", short);
        cache.insert(2, "b");
        cache.insert(3, "c");

        clock.advance(Duration::from_millis(75));
        cache.insert(4, "d");
        assert!(!cache.contains(&1));
        for k in [2, 3, 4] {
            assert!(cache.contains(&k), "key {k} should survive");
        }
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[test]
    fn chain_expires_everything_past_max_age() {
        let clock = ManualClock::new();
        let cache = Cache::new(LruPolicy::with_inner(8, manual_ttl(&clock)));
        for k in 0..5 {
            cache.insert(k, k);
        }
        clock.advance(MAX_AGE / 2);
        assert_eq!(cache.len(), 5);

        clock.advance(MAX_AGE * 2);
        assert!(cache.is_empty());
        cache.with_policy(|lru| assert!(lru.inner().is_empty()));
    }

    #[test]
    fn touch_restarts_the_lifetime() {
        let clock = ManualClock::new();
        let cache = Cache::new(manual_ttl(&clock));
        cache.insert(1, "a");

        clock.advance(Duration::from_millis(80));
        assert!(cache.touch(&1));
        clock.advance(Duration::from_millis(80));
        assert_eq!(cache.get(&1), Ok("a"));

        // the get above restarted it again
        clock.advance(Duration::from_millis(101));
        assert_eq!(cache.get(&1), Err(KeyNotFound));
    }

    #[test]
    fn contains_does_not_extend_lifetime() {
        let clock = ManualClock::new();
        let cache = Cache::new(manual_ttl(&clock));
        cache.insert(1, "a");
        clock.advance(Duration::from_millis(80));
        assert!(cache.contains(&1));
        clock.advance(Duration::from_millis(40));
        assert!(!cache.contains(&1));
    }

    #[test]
    fn explicit_ttl_beats_max_age_ms() {
        let clock = ManualClock::new();
        let cache = Cache::new(manual_ttl(&clock));
        let both = InsertOptions::new()
            .with_ttl(Duration::from_millis(300))
            .with_max_age_ms(50);
        cache.insert_with(1, "both", both);
        cache.insert_with(2, "ms", InsertOptions::new().with_max_age_ms(50));
        cache.insert(3, "default");

        clock.advance(Duration::from_millis(75));
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));

        clock.advance(Duration::from_millis(75));
        assert!(cache.contains(&1));
        assert!(!cache.contains(&3));
    }

    #[test]
    fn reinsert_resets_lifetime_and_value() {
        let clock = ManualClock::new();
        let cache = Cache::new(manual_ttl(&clock));
        cache.insert(1, "old");
        clock.advance(Duration::from_millis(80));
        assert_eq!(cache.insert(1, "new"), Some("old"));
        clock.advance(Duration::from_millis(80));
        assert_eq!(cache.get(&1), Ok("new"));
    }

    #[test]
    fn builder_chain_uses_shared_clock() {
        let clock = ManualClock::new();
        let shared: SharedClock = Arc::new(clock.clone());
        let cache = CacheBuilder::new()
            .clock(shared)
            .layer(CachePolicy::Lru { capacity: 4 })
            .layer(CachePolicy::Ttl { max_age: MAX_AGE })
            .build::<u32, &str>()
            .unwrap();
        cache.insert(1, "a");
        clock.advance(MAX_AGE / 2);
        assert_eq!(cache.get(&1), Ok("a"));
        clock.advance(MAX_AGE * 2);
        assert_eq!(cache.get(&1), Err(KeyNotFound));
        assert!(cache.is_empty());
    }
}

// ==============================================
// Lossy Store Recovery
// ==============================================

/// Store that silently drops writes for odd keys.
#[derive(Default)]
struct LossyStore {
    map: HashMap<u32, String>,
}

impl StoreCore<u32, String> for LossyStore {
    fn get(&self, key: &u32) -> Option<&String> {
        self.map.get(key)
    }

    fn contains(&self, key: &u32) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &u32> + '_> {
        Box::new(self.map.keys())
    }
}

impl StoreMut<u32, String> for LossyStore {
    fn insert(&mut self, key: u32, value: String) -> Option<String> {
        if key % 2 == 1 {
            return None;
        }
        self.map.insert(key, value)
    }

    fn remove(&mut self, key: &u32) -> Option<String> {
        self.map.remove(key)
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

mod lossy_store {
    use super::*;

    fn lossy_cache() -> Cache<u32, String, LruPolicy<u32>, LossyStore> {
        let cache = Cache::with_store(LruPolicy::new(4), LossyStore::default());
        for k in 0..4 {
            cache.insert(k, format!("v{k}"));
        }
        cache
    }

    #[test]
    fn drift_is_reported_before_lookup() {
        let cache = lossy_cache();
        assert!(cache.check_invariants().is_err());
    }

    #[test]
    fn lost_write_reads_as_absent_and_is_untracked() {
        let cache = lossy_cache();
        assert_eq!(cache.get(&1), Err(KeyNotFound));
        assert!(!cache.with_policy(|lru| lru.contains(&1)));
        assert_eq!(cache.get(&2), Ok("v2".to_string()));
    }

    #[test]
    fn lookups_repair_every_one_sided_record() {
        let cache = lossy_cache();
        for k in 0..4 {
            let live = cache.contains(&k);
            assert_eq!(live, k % 2 == 0, "key {k}");
        }
        cache.check_invariants().unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn repaired_slots_are_reused() {
        let cache = lossy_cache();
        assert!(!cache.touch(&1));
        assert!(!cache.touch(&3));
        // two free slots: neither even key is evicted
        cache.insert(4, "v4".to_string());
        cache.insert(6, "v6".to_string());
        for k in [0, 2, 4, 6] {
            assert!(cache.contains(&k), "key {k}");
        }
        cache.check_invariants().unwrap();
    }
}
