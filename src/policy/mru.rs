//! MRU (Most Recently Used) eviction layer.
//!
//! Evicts the key that was used most recently. Useful for cyclic scans larger
//! than the cache, where the item just touched is the one least likely to be
//! needed again soon.
//!
//! ## Architecture
//!
//! ```text
//!   head (MRU - EVICT FROM HERE)            tail (LRU - keep)
//!   [k3] ◄──► [k2] ◄──► [k1]
//!
//!   • New keys enter at head
//!   • Touched keys move to head
//!   • When full, the head is evicted before the new key is pushed
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::mru::MruPolicy;
//!
//! let mut mru = MruPolicy::new(2);
//! let opts = InsertOptions::default();
//! mru.insert(&1, &opts);
//! mru.insert(&2, &opts);
//! mru.touch(&1);
//! assert_eq!(mru.insert(&3, &opts), vec![1]);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::KeyList;
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Evicts the most recently admitted-or-touched key.
pub struct MruPolicy<K, C = NoPolicy> {
    recency: KeyList<K>,
    capacity: usize,
    inner: C,
}

impl<K> MruPolicy<K>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("mru capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> MruPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
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
    pub fn peek_mru(&self) -> Option<&K> {
        self.recency.front()
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        self.recency.debug_validate_invariants();
        debug_assert!(self.recency.len() <= self.capacity);
    }
}

impl<K, C> EvictionPolicy<K> for MruPolicy<K, C>
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
        if evicted.contains(key) || self.recency.move_to_front(key) {
            return evicted;
        }

        if self.capacity == 0 {
            reject(key, &mut self.inner, &mut evicted);
            return evicted;
        }

        if self.recency.len() >= self.capacity {
            if let Some(mru) = self.recency.pop_front() {
                self.inner.remove(&mru);
                evicted.push(mru);
            }
        }
        self.recency.push_front(key.clone());

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

impl<K, C> fmt::Debug for MruPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MruPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.recency.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
