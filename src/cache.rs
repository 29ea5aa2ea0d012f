//! The cache orchestrator.
//!
//! [`Cache`] owns one store, one policy chain, and one guard. Every public
//! operation takes the guard once, runs lazy expiration (except
//! [`clear`](Cache::clear)), then keeps the store in step with the chain's
//! view of which keys are live.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ Cache<K, V, P, S, G>                                             │
//!   │                                                                  │
//!   │   G::Cell<State>  ◄── one acquisition per public call            │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │ policy: P  (EvictionPolicy<K>, possibly a chain)           │ │
//!   │   │ store:  S  (StoreMut<K, V>)                                │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────┘
//!
//!   insert(k, v):  expire ─► policy.insert(k) ─► drop victims from store
//!                          ─► store.insert(k, v) unless k was refused
//!   get(k):        expire ─► reconcile(k) ─► policy.touch(k) ─► store.get(k)
//! ```
//!
//! ## Membership
//!
//! A key is live only when the policy chain tracks it *and* the store holds a
//! value for it. The cache keeps the two sides in step on every write, but a
//! custom store or a policy mutated through other means can still drift.
//! When a lookup finds a one-sided record it drops that record (from the
//! chain or from the store) and reports the key absent.
//! [`check_invariants`](Cache::check_invariants) reports drift without
//! repairing it.
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::cache::Cache;
//! use chaincache::policy::lru::LruPolicy;
//!
//! let cache = Cache::new(LruPolicy::new(2));
//! cache.insert(1, "one");
//! cache.insert(2, "two");
//! assert_eq!(cache.get(&1), Ok("one"));
//!
//! // 2 is now least recently used
//! cache.insert(3, "three");
//! assert!(!cache.contains(&2));
//! assert_eq!(cache.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::{InvariantError, KeyNotFound};
use crate::guard::{Guard, NoLock};
use crate::policy::{EvictionPolicy, InsertOptions};
use crate::store::hashmap::HashMapStore;
use crate::store::traits::{StoreCore, StoreMetrics, StoreMut};

#[cfg(feature = "concurrency")]
use crate::guard::MutexLock;

struct State<K, V, P, S> {
    policy: P,
    store: S,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, P, S> State<K, V, P, S>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
    S: StoreMut<K, V>,
{
    /// Runs the chain's expiry and drops the returned keys from the store.
    fn expire(&mut self) -> usize {
        let expired = self.policy.expire();
        let mut removed = 0;
        for key in &expired {
            if self.store.remove(key).is_some() {
                self.store.record_eviction();
                removed += 1;
            }
        }
        #[cfg(feature = "tracing")]
        if !expired.is_empty() {
            tracing::trace!(expired = expired.len(), removed, "expired cache entries");
        }
        removed
    }

    /// Returns whether `key` is live, dropping any one-sided record.
    fn reconcile(&mut self, key: &K) -> bool {
        let tracked = self.policy.contains(key);
        let stored = self.store.contains(key);
        if tracked && stored {
            return true;
        }
        #[cfg(feature = "tracing")]
        if tracked || stored {
            tracing::trace!(tracked, stored, "dropping one-sided cache record");
        }
        // clears partial records left in individual layers as well
        self.policy.remove(key);
        if stored {
            self.store.remove(key);
        }
        false
    }

    /// Reconciles and touches `key`; on success the store holds its value.
    fn refresh(&mut self, key: &K) -> bool {
        if !self.reconcile(key) {
            return false;
        }
        if self.policy.touch(key) {
            return true;
        }
        self.policy.remove(key);
        self.store.remove(key);
        false
    }
}

/// A cache whose eviction decisions come from the policy chain `P`.
///
/// All operations take `&self`: reads that refresh recency are logically
/// read-only but mutate bookkeeping through the guard `G`. With the default
/// [`NoLock`] guard the cache is not `Sync`; use [`Cache::concurrent`] (or the
/// `MutexLock` guard) to share it between threads.
pub struct Cache<K, V, P, S = HashMapStore<K, V>, G: Guard = NoLock> {
    state: G::Cell<State<K, V, P, S>>,
}

impl<K, V, P> Cache<K, V, P>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
{
    /// Creates a single-threaded cache backed by a [`HashMapStore`].
    pub fn new(policy: P) -> Self {
        Self::with_store(policy, HashMapStore::new())
    }
}

impl<K, V, P, S> Cache<K, V, P, S>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
    S: StoreMut<K, V>,
{
    /// Creates a single-threaded cache over a caller-supplied store.
    ///
    /// The store should start empty; pre-existing values are not tracked by
    /// the policy and are dropped the first time they are looked up.
    pub fn with_store(policy: P, store: S) -> Self {
        Self::from_parts(policy, store)
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, P> Cache<K, V, P, HashMapStore<K, V>, MutexLock>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
{
    /// Creates a thread-safe cache backed by a [`HashMapStore`].
    ///
    /// ```
    /// use std::sync::Arc;
    /// use chaincache::cache::Cache;
    /// use chaincache::policy::fifo::FifoPolicy;
    ///
    /// let cache = Arc::new(Cache::concurrent(FifoPolicy::new(64)));
    /// let writer = Arc::clone(&cache);
    /// std::thread::spawn(move || writer.insert(1u32, 10u64)).join().unwrap();
    /// assert_eq!(cache.get(&1), Ok(10));
    /// ```
    pub fn concurrent(policy: P) -> Self {
        Self::from_parts(policy, HashMapStore::new())
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, P, S> Cache<K, V, P, S, MutexLock>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
    S: StoreMut<K, V>,
{
    /// Creates a thread-safe cache over a caller-supplied store.
    pub fn concurrent_with_store(policy: P, store: S) -> Self {
        Self::from_parts(policy, store)
    }
}

impl<K, V, P, S, G> Cache<K, V, P, S, G>
where
    K: Clone + Eq + Hash,
    P: EvictionPolicy<K>,
    S: StoreMut<K, V>,
    G: Guard,
{
    /// Creates a cache with an explicit guard type.
    pub fn from_parts(policy: P, store: S) -> Self {
        Self {
            state: G::new_cell(State {
                policy,
                store,
                _marker: PhantomData,
            }),
        }
    }

    /// Consumes the cache, returning its policy chain and store.
    pub fn into_parts(self) -> (P, S) {
        let State { policy, store, .. } = G::into_inner(self.state);
        (policy, store)
    }

    fn locked<R>(&self, f: impl FnOnce(&mut State<K, V, P, S>) -> R) -> R {
        G::with(&self.state, f)
    }

    /// Number of live keys, after expiration.
    pub fn len(&self) -> usize {
        self.locked(|state| {
            state.expire();
            state.policy.len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is live. Does not refresh recency.
    pub fn contains(&self, key: &K) -> bool {
        self.locked(|state| {
            state.expire();
            state.reconcile(key)
        })
    }

    /// Returns a clone of the value for `key`, refreshing its bookkeeping.
    ///
    /// # Example
    ///
    /// ```
    /// use chaincache::cache::Cache;
    /// use chaincache::error::KeyNotFound;
    /// use chaincache::policy::fifo::FifoPolicy;
    ///
    /// let cache = Cache::new(FifoPolicy::new(4));
    /// cache.insert("k", vec![1, 2, 3]);
    /// assert_eq!(cache.get(&"k"), Ok(vec![1, 2, 3]));
    /// assert_eq!(cache.get(&"missing"), Err(KeyNotFound));
    /// ```
    pub fn get(&self, key: &K) -> Result<V, KeyNotFound>
    where
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Runs `f` on the value for `key` without cloning it.
    ///
    /// `f` runs while the guard is held and must not call back into this
    /// cache.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Result<R, KeyNotFound> {
        self.locked(|state| {
            state.expire();
            if !state.refresh(key) {
                state.store.record_miss();
                return Err(KeyNotFound);
            }
            state.store.get(key).map(f).ok_or(KeyNotFound)
        })
    }

    /// Like [`get`](Self::get), reporting absence as `None`.
    pub fn try_get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.get(key).ok()
    }

    /// Refreshes bookkeeping for `key` without reading its value. Returns
    /// whether the key is live.
    pub fn touch(&self, key: &K) -> bool {
        self.locked(|state| {
            state.expire();
            state.refresh(key)
        })
    }

    /// Inserts or updates `key` with the chain's default options.
    ///
    /// Returns the value previously stored under `key`.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.insert_with(key, value, InsertOptions::default())
    }

    /// Inserts or updates `key`, forwarding `options` to every policy layer.
    ///
    /// If a layer refuses the key (capacity 0), nothing is stored and any
    /// previous value is dropped and returned.
    ///
    /// ```
    /// use std::time::Duration;
    /// use chaincache::cache::Cache;
    /// use chaincache::policy::InsertOptions;
    /// use chaincache::policy::ttl::TtlPolicy;
    ///
    /// let cache = Cache::new(TtlPolicy::new(Duration::from_secs(60)));
    /// let short = InsertOptions::new().with_ttl(Duration::from_secs(5));
    /// cache.insert_with("token", 7, short);
    /// assert_eq!(cache.get(&"token"), Ok(7));
    /// ```
    pub fn insert_with(&self, key: K, value: V, options: InsertOptions) -> Option<V> {
        self.locked(|state| {
            state.expire();
            let evicted = state.policy.insert(&key, &options);
            let mut refused = false;
            for victim in &evicted {
                if *victim == key {
                    refused = true;
                    continue;
                }
                if state.store.remove(victim).is_some() {
                    state.store.record_eviction();
                }
            }
            #[cfg(feature = "tracing")]
            if !evicted.is_empty() {
                tracing::trace!(evicted = evicted.len(), refused, "policy evicted keys");
            }
            if refused {
                return state.store.remove(&key);
            }
            state.store.insert(key, value)
        })
    }

    /// Removes `key`, returning its value. Absent keys are a no-op.
    ///
    /// A value the chain does not track is not live: it is dropped from the
    /// store but not returned.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.locked(|state| {
            state.expire();
            if !state.policy.remove(key) {
                state.store.remove(key);
                return None;
            }
            state.store.remove(key)
        })
    }

    /// Drops every entry. Does not run expiration first.
    pub fn clear(&self) {
        self.locked(|state| {
            state.policy.clear();
            state.store.clear();
        })
    }

    /// Runs lazy expiration now, returning how many stored values it removed.
    pub fn expire(&self) -> usize {
        self.locked(|state| state.expire())
    }

    /// Gives read-only access to the policy chain.
    ///
    /// ```
    /// use chaincache::cache::Cache;
    /// use chaincache::policy::lru::LruPolicy;
    ///
    /// let cache = Cache::new(LruPolicy::new(4));
    /// cache.insert(1, ());
    /// cache.insert(2, ());
    /// cache.touch(&1);
    /// assert_eq!(cache.with_policy(|lru| lru.peek_lru().copied()), Some(2));
    /// ```
    pub fn with_policy<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        self.locked(|state| f(&state.policy))
    }

    /// Snapshot of the store's counters.
    pub fn metrics(&self) -> StoreMetrics {
        self.locked(|state| state.store.metrics())
    }

    /// Verifies that the store and every layer of the policy chain agree on
    /// membership.
    ///
    /// Each layer must track as many keys as the store holds, and every
    /// stored key must be tracked by the whole chain. Does not expire or
    /// repair anything.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.locked(|state| {
            let stored = state.store.len();
            let mut layers = state.policy.layer_lens();
            if layers.is_empty() {
                layers.push(state.policy.len());
            }
            if let Some((depth, tracked)) = layers
                .iter()
                .enumerate()
                .find(|(_, tracked)| **tracked != stored)
            {
                return Err(InvariantError::new(format!(
                    "store holds {stored} keys, policy layer {depth} tracks {tracked}"
                )));
            }
            let untracked = state
                .store
                .keys()
                .filter(|key| !state.policy.contains(*key))
                .count();
            if untracked > 0 {
                return Err(InvariantError::new(format!(
                    "{untracked} stored keys are not tracked by every policy layer"
                )));
            }
            Ok(())
        })
    }
}

impl<K, V, P, S, G> fmt::Debug for Cache<K, V, P, S, G>
where
    P: fmt::Debug,
    G: Guard,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = G::with(&self.state, |state| format!("{:?}", state.policy));
        f.debug_struct("Cache")
            .field("policy", &format_args!("{policy}"))
            .finish_non_exhaustive()
    }
}
