//! # Least Frequently Used (LFU) eviction layer
//!
//! Counts admissions and touches per key. When a new key arrives at a full
//! layer, the key with the lowest count is evicted; ties go to the key that
//! was used least recently.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        LfuPolicy<K, C>                               │
//!   │                                                                      │
//!   │   entries: FxHashMap<K, Rank>        ranking: BTreeMap<Rank, K>      │
//!   │                                                                      │
//!   │   ┌───────┬───────────────┐          ┌──────────────────┬───────┐    │
//!   │   │  Key  │ (count, tick) │          │ (count, tick)    │  Key  │    │
//!   │   ├───────┼───────────────┤          ├──────────────────┼───────┤    │
//!   │   │  "a"  │   (3, 7)      │          │ (1, 5)  ◄─ EVICT │  "c"  │    │
//!   │   │  "b"  │   (1, 6)      │          │ (1, 6)           │  "b"  │    │
//!   │   │  "c"  │   (1, 5)      │          │ (3, 7)           │  "a"  │    │
//!   │   └───────┴───────────────┘          └──────────────────┴───────┘    │
//!   │                                                                      │
//!   │   tick: monotonically increasing use counter, breaks count ties      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time     | Notes                                   |
//! |------------|----------|-----------------------------------------|
//! | `insert`   | O(log n) | new key count 1; re-insert increments   |
//! | `touch`    | O(log n) | increments count, refreshes tick        |
//! | `remove`   | O(log n) | drops both index entries                |
//! | `contains` | O(1)     | no count change                         |
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::lfu::LfuPolicy;
//!
//! let mut lfu = LfuPolicy::new(2);
//! let opts = InsertOptions::default();
//! lfu.insert(&"hot", &opts);
//! lfu.insert(&"cold", &opts);
//! lfu.touch(&"hot");
//! lfu.touch(&"hot");
//! assert_eq!(lfu.insert(&"new", &opts), vec!["cold"]);
//! assert_eq!(lfu.frequency(&"hot"), Some(3));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Ordering key: access count first, then the tick of the last use.
type Rank = (u64, u64);

/// Evicts the least frequently used key, least recent first among equals.
pub struct LfuPolicy<K, C = NoPolicy> {
    entries: FxHashMap<K, Rank>,
    ranking: BTreeMap<Rank, K>,
    tick: u64,
    capacity: usize,
    inner: C,
}

impl<K> LfuPolicy<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("lfu capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> LfuPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    pub fn with_inner(capacity: usize, inner: C) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ranking: BTreeMap::new(),
            tick: 0,
            capacity,
            inner,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Access count recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|&(count, _)| count)
    }

    /// The key that would be evicted next.
    pub fn peek_lfu(&self) -> Option<&K> {
        self.ranking.values().next()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Increments the count of a tracked key. Returns `false` if untracked.
    fn bump(&mut self, key: &K) -> bool {
        let tick = self.next_tick();
        let Some(rank) = self.entries.get_mut(key) else {
            return false;
        };
        let old = *rank;
        *rank = (old.0.saturating_add(1), tick);
        let new = *rank;
        if let Some(k) = self.ranking.remove(&old) {
            self.ranking.insert(new, k);
        }
        true
    }

    fn forget(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(rank) => {
                self.ranking.remove(&rank);
                true
            },
            None => false,
        }
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.entries.len(), self.ranking.len());
        debug_assert!(self.entries.len() <= self.capacity);
        for (rank, key) in &self.ranking {
            debug_assert_eq!(self.entries.get(key), Some(rank));
        }
    }
}

impl<K, C> EvictionPolicy<K> for LfuPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
{
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key) && self.bump(key)
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let mut evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.forget(victim);
        }
        if evicted.contains(key) || self.bump(key) {
            return evicted;
        }

        if self.capacity == 0 {
            reject(key, &mut self.inner, &mut evicted);
            return evicted;
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, victim)) = self.ranking.pop_first() {
                self.entries.remove(&victim);
                self.inner.remove(&victim);
                evicted.push(victim);
            }
        }
        let rank = (1, self.next_tick());
        self.entries.insert(key.clone(), rank);
        self.ranking.insert(rank, key.clone());

        #[cfg(debug_assertions)]
        self.validate_invariants();

        evicted
    }

    fn remove(&mut self, key: &K) -> bool {
        self.inner.remove(key);
        self.forget(key)
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.entries.clear();
        self.ranking.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let expired = self.inner.expire();
        for key in &expired {
            self.forget(key);
        }
        expired
    }
}

impl<K, C> fmt::Debug for LfuPolicy<K, C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
