//! LIFO (Last In, First Out) eviction layer.
//!
//! Stack-shaped eviction: when full, the most recently admitted key that is
//! still tracked is dropped to make room for the new one. Access never
//! reorders, and re-inserting a tracked key is a no-op here.
//!
//! ## Architecture
//!
//! ```text
//!   order: KeyList<K>
//!
//!   front                               back
//!   [d] ◄──► [c] ◄──► [b] ◄──► [a]
//!   top ─► EVICT                bottom (kept)
//!
//!   insert(e) at capacity 4:
//!     1. inner.insert(e), forget inner victims
//!     2. pop_front → d, inner.remove(d)
//!     3. push_front(e)
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::lifo::LifoPolicy;
//!
//! let mut lifo = LifoPolicy::new(2);
//! let opts = InsertOptions::default();
//! lifo.insert(&1, &opts);
//! lifo.insert(&2, &opts);
//! assert_eq!(lifo.insert(&3, &opts), vec![2]);
//! assert_eq!(lifo.insert(&4, &opts), vec![3]);
//! assert!(lifo.contains(&1));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::ds::KeyList;
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Evicts the newest surviving admission once `capacity` keys are tracked.
pub struct LifoPolicy<K, C = NoPolicy> {
    stack: KeyList<K>,
    capacity: usize,
    inner: C,
}

impl<K> LifoPolicy<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a standalone LIFO layer. A capacity of 0 refuses every key.
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("lifo capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> LifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    pub fn with_inner(capacity: usize, inner: C) -> Self {
        Self {
            stack: KeyList::with_capacity(capacity),
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

    /// Tracked keys from the top of the stack to the bottom.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.stack.iter()
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        self.stack.debug_validate_invariants();
        debug_assert!(self.stack.len() <= self.capacity);
    }
}

impl<K, C> EvictionPolicy<K> for LifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
{
    fn len(&self) -> usize {
        self.stack.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    fn contains(&self, key: &K) -> bool {
        self.stack.contains(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key) && self.stack.contains(key)
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let mut evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.stack.remove(victim);
        }
        if evicted.contains(key) || self.stack.contains(key) {
            return evicted;
        }

        if self.capacity == 0 {
            reject(key, &mut self.inner, &mut evicted);
            return evicted;
        }

        if self.stack.len() >= self.capacity {
            if let Some(top) = self.stack.pop_front() {
                self.inner.remove(&top);
                evicted.push(top);
            }
        }
        self.stack.push_front(key.clone());

        #[cfg(debug_assertions)]
        self.validate_invariants();

        evicted
    }

    fn remove(&mut self, key: &K) -> bool {
        self.inner.remove(key);
        self.stack.remove(key)
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.stack.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let expired = self.inner.expire();
        for key in &expired {
            self.stack.remove(key);
        }
        expired
    }
}

impl<K, C> fmt::Debug for LifoPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifoPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.stack.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
