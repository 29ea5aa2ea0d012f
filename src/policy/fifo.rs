//! FIFO (First In, First Out) eviction layer.
//!
//! Evicts the key that was admitted earliest. Access never reorders, and
//! re-inserting a tracked key keeps its original position.
//!
//! ## Architecture
//!
//! ```text
//!   order: KeyList<K>
//!
//!   front                               back
//!   [d] ◄──► [c] ◄──► [b] ◄──► [a]
//!   newest                      oldest ─► EVICT
//!
//!   insert(e) at capacity 4:
//!     1. inner.insert(e), forget inner victims
//!     2. pop_back → a, inner.remove(a)
//!     3. push_front(e)
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time | Notes                               |
//! |------------|------|-------------------------------------|
//! | `insert`   | O(1) | plus inner layer cost               |
//! | `touch`    | O(1) | no reordering                       |
//! | `remove`   | O(1) | propagates to inner                 |
//! | `contains` | O(1) | own record AND inner                |
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::fifo::FifoPolicy;
//!
//! let mut fifo = FifoPolicy::new(2);
//! let opts = InsertOptions::default();
//! fifo.insert(&"a", &opts);
//! fifo.insert(&"b", &opts);
//! fifo.touch(&"a");
//! assert_eq!(fifo.insert(&"c", &opts), vec!["a"]);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::KeyList;
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Evicts in admission order once `capacity` keys are tracked.
pub struct FifoPolicy<K, C = NoPolicy> {
    order: KeyList<K>,
    capacity: usize,
    inner: C,
}

impl<K> FifoPolicy<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a standalone FIFO layer.
    ///
    /// A capacity of 0 is honored: every admission is refused.
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    /// Creates a standalone FIFO layer, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("fifo capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> FifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    /// Creates a FIFO layer wrapping `inner`.
    pub fn with_inner(capacity: usize, inner: C) -> Self {
        Self {
            order: KeyList::with_capacity(capacity),
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

    /// Tracked keys from newest to oldest admission.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        self.order.debug_validate_invariants();
        debug_assert!(
            self.order.len() <= self.capacity,
            "fifo tracks {} keys over capacity {}",
            self.order.len(),
            self.capacity
        );
    }
}

impl<K, C> EvictionPolicy<K> for FifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
{
    fn len(&self) -> usize {
        self.order.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    fn contains(&self, key: &K) -> bool {
        self.order.contains(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key) && self.order.contains(key)
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let mut evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.order.remove(victim);
        }
        if evicted.contains(key) || self.order.contains(key) {
            return evicted;
        }

        if self.capacity == 0 {
            reject(key, &mut self.inner, &mut evicted);
            return evicted;
        }

        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_back() {
                self.inner.remove(&oldest);
                evicted.push(oldest);
            }
        }
        self.order.push_front(key.clone());

        #[cfg(debug_assertions)]
        self.validate_invariants();

        evicted
    }

    fn remove(&mut self, key: &K) -> bool {
        self.inner.remove(key);
        self.order.remove(key)
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.order.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let expired = self.inner.expire();
        for key in &expired {
            self.order.remove(key);
        }
        expired
    }
}

impl<K, C> fmt::Debug for FifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.order.len())
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

    fn order<C>(policy: &FifoPolicy<u32, C>) -> Vec<u32> {
        policy.iter().copied().collect()
    }

    // ==============================================
    // Basic Operations
    // ==============================================

    mod basic_operations {
        use super::*;

        #[test]
        fn new_policy_is_empty() {
            let policy: FifoPolicy<u32> = FifoPolicy::new(4);
            assert!(policy.is_empty());
            assert_eq!(policy.capacity(), 4);
        }

        #[test]
        fn insert_tracks_keys_newest_first() {
            let mut policy = FifoPolicy::new(4);
            for k in 1..=3 {
                assert!(policy.insert(&k, &opts()).is_empty());
            }
            assert_eq!(order(&policy), vec![3, 2, 1]);
            assert!(policy.contains(&2));
        }

        #[test]
        fn reinsert_keeps_original_position() {
            let mut policy = FifoPolicy::new(3);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert!(policy.insert(&1, &opts()).is_empty());
            assert_eq!(order(&policy), vec![2, 1]);
        }

        #[test]
        fn remove_reports_presence() {
            let mut policy = FifoPolicy::new(3);
            policy.insert(&1, &opts());
            assert!(policy.remove(&1));
            assert!(!policy.remove(&1));
            assert!(!policy.touch(&1));
        }
    }

    // ==============================================
    // Eviction Behavior
    // ==============================================

    mod eviction_behavior {
        use super::*;

        #[test]
        fn evicts_oldest_admission() {
            let mut policy = FifoPolicy::new(2);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert_eq!(policy.insert(&3, &opts()), vec![1]);
            assert_eq!(policy.insert(&4, &opts()), vec![2]);
            assert_eq!(order(&policy), vec![4, 3]);
        }

        #[test]
        fn touch_does_not_protect() {
            let mut policy = FifoPolicy::new(2);
            policy.insert(&1, &opts());
            policy.insert(&2, &opts());
            assert!(policy.touch(&1));
            assert_eq!(policy.insert(&3, &opts()), vec![1]);
        }

        #[test]
        fn victims_are_removed_from_inner_layer() {
            let mut policy = FifoPolicy::with_inner(1, FifoPolicy::new(8));
            policy.insert(&1, &opts());
            assert_eq!(policy.insert(&2, &opts()), vec![1]);
            assert!(!policy.inner().contains(&1));
            assert_eq!(policy.inner().len(), 1);
        }

        #[test]
        fn inner_victims_are_forgotten() {
            let mut policy = FifoPolicy::with_inner(8, FifoPolicy::new(1));
            policy.insert(&1, &opts());
            assert_eq!(policy.insert(&2, &opts()), vec![1]);
            assert_eq!(order(&policy), vec![2]);
        }
    }

    // ==============================================
    // Edge Cases
    // ==============================================

    mod edge_cases {
        use super::*;

        #[test]
        fn zero_capacity_refuses_admission() {
            let mut policy = FifoPolicy::with_inner(0, FifoPolicy::new(4));
            assert_eq!(policy.insert(&7, &opts()), vec![7]);
            assert!(policy.is_empty());
            assert!(policy.inner().is_empty());
        }

        #[test]
        fn try_new_rejects_zero() {
            assert!(FifoPolicy::<u32>::try_new(0).is_err());
            assert!(FifoPolicy::<u32>::try_new(1).is_ok());
        }

        #[test]
        fn clear_propagates() {
            let mut policy = FifoPolicy::with_inner(4, FifoPolicy::new(4));
            policy.insert(&1, &opts());
            policy.clear();
            assert!(policy.is_empty());
            assert!(policy.inner().is_empty());
        }
    }
}
