//! Random eviction layer.
//!
//! When full, evicts a uniformly random tracked key to make room for a new
//! one. Access never changes a key's odds.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, usize>         members: Vec<K>
//!   ┌─────┬─────┐                      ┌─────┬─────┬─────┬─────┐
//!   │ "a" │  0  │ ───────────────────► │ "a" │ "b" │ "c" │ "d" │
//!   │ "b" │  1  │                      └─────┴─────┴─────┴─────┘
//!   │ ... │ ... │                         0     1     2     3
//!   └─────┴─────┘
//!
//!   evict: pick i in 0..len, swap_remove(i), patch the moved key's index
//! ```
//!
//! Each layer owns its own [`SmallRng`]; use [`RandomPolicy::with_seed`] for
//! reproducible victim sequences.
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::random::RandomPolicy;
//!
//! let mut policy = RandomPolicy::with_seed(2, 42);
//! let opts = InsertOptions::default();
//! policy.insert(&1, &opts);
//! policy.insert(&2, &opts);
//! let evicted = policy.insert(&3, &opts);
//! assert_eq!(evicted.len(), 1);
//! assert!(policy.contains(&3));
//! ```

use std::fmt;
use std::hash::Hash;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy, reject};

/// Evicts a uniformly random survivor once `capacity` keys are tracked.
pub struct RandomPolicy<K, C = NoPolicy> {
    index: FxHashMap<K, usize>,
    members: Vec<K>,
    capacity: usize,
    rng: SmallRng,
    inner: C,
}

impl<K> RandomPolicy<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a standalone random layer seeded from the operating system.
    pub fn new(capacity: usize) -> Self {
        Self::with_inner(capacity, NoPolicy)
    }

    /// Creates a standalone random layer with a fixed seed.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::from_parts(capacity, NoPolicy, SmallRng::seed_from_u64(seed))
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("random capacity must be greater than zero"));
        }
        Ok(Self::new(capacity))
    }
}

impl<K, C> RandomPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    pub fn with_inner(capacity: usize, inner: C) -> Self {
        Self::from_parts(capacity, inner, SmallRng::from_os_rng())
    }

    /// Creates a random layer wrapping `inner` with an explicit generator.
    pub fn from_parts(capacity: usize, inner: C, rng: SmallRng) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            members: Vec::with_capacity(capacity),
            capacity,
            rng,
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

    fn forget(&mut self, key: &K) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        self.members.swap_remove(idx);
        if let Some(moved) = self.members.get(idx) {
            self.index.insert(moved.clone(), idx);
        }
        true
    }

    fn evict_random(&mut self) -> Option<K> {
        if self.members.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.members.len());
        let victim = self.members[idx].clone();
        self.forget(&victim);
        Some(victim)
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.index.len(), self.members.len());
        debug_assert!(self.members.len() <= self.capacity);
        for (i, key) in self.members.iter().enumerate() {
            debug_assert_eq!(self.index.get(key), Some(&i), "stale member index");
        }
    }
}

impl<K, C> EvictionPolicy<K> for RandomPolicy<K, C>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
{
    fn len(&self) -> usize {
        self.members.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        self.inner.touch(key) && self.index.contains_key(key)
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let mut evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.forget(victim);
        }
        if evicted.contains(key) || self.index.contains_key(key) {
            return evicted;
        }

        if self.capacity == 0 {
            reject(key, &mut self.inner, &mut evicted);
            return evicted;
        }

        if self.members.len() >= self.capacity {
            if let Some(victim) = self.evict_random() {
                self.inner.remove(&victim);
                evicted.push(victim);
            }
        }
        self.index.insert(key.clone(), self.members.len());
        self.members.push(key.clone());

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
        self.index.clear();
        self.members.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let expired = self.inner.expire();
        for key in &expired {
            self.forget(key);
        }
        expired
    }
}

impl<K, C> fmt::Debug for RandomPolicy<K, C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.members.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
