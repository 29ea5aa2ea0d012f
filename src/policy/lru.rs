//! # Least Recently Used (LRU) eviction layer
//!
//! Tracks recency with a [`KeyList`]: admissions and accesses move a key to
//! the front, and eviction drops from the back.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                       LruPolicy<K, C>                            │
//!   │                                                                  │
//!   │   index: FxHashMap<K, usize>   (position in a dense link Vec)    │
//!   │          │                                                       │
//!   │          ▼                                                       │
//!   │   head ──► [k3] ◄──► [k2] ◄──► [k1] ◄── tail                     │
//!   │   most recently used            least recently used ─► EVICT     │
//!   │                                                                  │
//!   │   inner: C   (every call is forwarded here first)                │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time | Notes                                        |
//! |------------|------|----------------------------------------------|
//! | `insert`   | O(1) | move-or-push to head, then trim the tail     |
//! | `touch`    | O(1) | move to head                                 |
//! | `remove`   | O(1) | unlink, propagate                            |
//! | `contains` | O(1) | no reordering                                |
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::lru::LruPolicy;
//!
//! let mut lru = LruPolicy::new(2);
//! let opts = InsertOptions::default();
//! lru.insert(&"a", &opts);
//! lru.insert(&"b", &opts);
//! lru.touch(&"a");
//! assert_eq!(lru.insert(&"c", &opts), vec!["b"]);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::KeyList;
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Evicts the least recently admitted-or-touched key.
pub struct LruPolicy<K, C = NoPolicy> {
    recency: KeyList<K>,
    capacity: usize,
    inner: C,
}

impl<K> LruPolicy<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a standalone LRU layer. A capacity of 0 refuses every key.
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    /// Creates a standalone LRU layer, rejecting a zero capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use chaincache::policy::lru::LruPolicy;
    ///
    /// assert!(LruPolicy::<u32>::try_new(8).is_ok());
    /// assert!(LruPolicy::<u32>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("lru capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> LruPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LRU layer wrapping `inner`.
    pub fn with_inner(capacity: usize, inner: C) -> Self {
        Self {
            recency: KeyList::with_capacity(capacity),
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

    /// The key that would be evicted next.
    pub fn peek_lru(&self) -> Option<&K> {
        self.recency.back()
    }

    /// Tracked keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.recency.iter()
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        self.recency.debug_validate_invariants();
        debug_assert!(self.recency.len() <= self.capacity);
    }
}

impl<K, C> EvictionPolicy<K> for LruPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
{
    fn len(&self) -> usize {
        self.recency.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    fn contains(&self, key: &K) -> bool {
        self.recency.contains(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key) && self.recency.move_to_front(key)
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let mut evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.recency.remove(victim);
        }
        if evicted.contains(key) {
            return evicted;
        }

        if !self.recency.move_to_front(key) {
            if self.capacity == 0 {
                reject(key, &mut self.inner, &mut evicted);
                return evicted;
            }
            self.recency.push_front(key.clone());
        }

        while self.recency.len() > self.capacity {
            match self.recency.pop_back() {
                Some(lru) => {
                    self.inner.remove(&lru);
                    evicted.push(lru);
                },
                None => break,
            }
        }

        #[cfg(debug_assertions)]
        self.validate_invariants();

        evicted
    }

    fn remove(&mut self, key: &K) -> bool {
        self.inner.remove(key);
        self.recency.remove(key)
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.recency.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let expired = self.inner.expire();
        for key in &expired {
            self.recency.remove(key);
        }
        expired
    }
}

impl<K, C> fmt::Debug for LruPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.recency.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> InsertOptions {
        InsertOptions::default()
    }

    fn recency(policy: &LruPolicy<u32>) -> Vec<u32> {
        policy.iter().copied().collect()
    }

    // ==============================================
    // Basic Operations
    // ==============================================

    mod basic_operations {
        use super::*;

        #[test]
        fn insert_places_key_at_head() {
            let mut policy = LruPolicy::new(4);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert_eq!(recency(&policy), vec![2, 1]);
            assert_eq!(policy.peek_lru(), Some(&1));
        }

        #[test]
        fn touch_moves_to_head() {
            let mut policy = LruPolicy::new(4);
            for k in 1..=3 {
                policy.insert(&k, &opts());
            }
            assert!(policy.touch(&1));
            assert_eq!(recency(&policy), vec![1, 3, 2]);
            assert!(!policy.touch(&9));
        }

        #[test]
        fn reinsert_refreshes_recency() {
            let mut policy = LruPolicy::new(2);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert!(policy.insert(&1, &opts()).is_empty());
            assert_eq!(policy.insert(&3, &opts()), vec![2]);
        }

        #[test]
        fn contains_does_not_reorder() {
            let mut policy = LruPolicy::new(2);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert!(policy.contains(&1));
            assert_eq!(policy.insert(&3, &opts()), vec![1]);
        }
    }

    // ==============================================
    // Eviction Behavior
    // ==============================================

    mod eviction_behavior {
        use super::*;

        #[test]
        fn evicts_least_recently_used() {
            let mut policy = LruPolicy::new(3);
            for k in 1..=3 {
                policy.insert(&k, &opts());
            }
            policy.touch(&1);
            policy.touch(&2);
            assert_eq!(policy.insert(&4, &opts()), vec![3]);
            assert_eq!(policy.insert(&5, &opts()), vec![1]);
        }

        #[test]
        fn victim_removed_from_inner() {
            let mut policy = LruPolicy::with_inner(1, LruPolicy::new(4));
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert!(!policy.inner().contains(&1));
            assert!(policy.inner().contains(&2));
        }

        #[test]
        fn inner_refusal_is_respected() {
            let mut policy = LruPolicy::with_inner(4, LruPolicy::new(0));
            assert_eq!(policy.insert(&1, &opts()), vec![1]);
            assert!(policy.is_empty());
        }

        #[test]
        fn touch_fails_when_inner_lost_key() {
            let mut policy = LruPolicy::with_inner(4, LruPolicy::new(4));
            policy.insert(&1, &opts());
            policy.inner_mut().remove(&1);
            assert!(!policy.contains(&1));
            assert!(!policy.touch(&1));
        }
    }

    // ==============================================
    // Edge Cases
    // ==============================================

    mod edge_cases {
        use super::*;

        #[test]
        fn capacity_one_keeps_latest() {
            let mut policy = LruPolicy::new(1);
            policy.insert(&1, &opts());
            assert_eq!(policy.insert(&2, &opts()), vec![1]);
            assert_eq!(recency(&policy), vec![2]);
        }

        #[test]
        fn zero_capacity_refuses_admission() {
            let mut policy: LruPolicy<u32> = LruPolicy::new(0);
            assert_eq!(policy.insert(&1, &opts()), vec![1]);
            assert!(policy.is_empty());
        }

        #[test]
        #[cfg(debug_assertions)]
        fn validate_invariants_after_operations() {
            let mut policy = LruPolicy::new(8);
            for k in 0..40u32 {
                policy.insert(&(k % 13), &opts());
                policy.touch(&(k % 5));
                policy.validate_invariants();
            }
            policy.clear();
            policy.validate_invariants();
        }
    }
}
