//! Storage backends for the cache.
//!
//! Stores own values and answer lookups; they know nothing about eviction.
//! The policy chain decides which keys are live and the cache keeps the
//! store in step with it. Any type implementing [`StoreCore`] and
//! [`StoreMut`] can back a [`Cache`](crate::cache::Cache).

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of store-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub removes: u64,
    pub evictions: u64,
}

/// Relaxed atomic counters behind [`StoreMetrics`].
///
/// Counting goes through `&self` so read paths can record hits and misses.
#[derive(Debug, Default)]
pub struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
}

impl StoreCounters {
    pub fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read operations common to all backends.
pub trait StoreCore<K, V> {
    /// Fetch a value by key, counting a hit or a miss.
    fn get(&self, key: &K) -> Option<&V>;

    /// Check if a key exists. Does not touch metrics.
    fn contains(&self, key: &K) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    /// Check if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored key, in no particular order.
    fn keys(&self) -> Box<dyn Iterator<Item = &K> + '_>;

    /// Snapshot the store's current metrics.
    fn metrics(&self) -> StoreMetrics {
        StoreMetrics::default()
    }

    /// Record that the policy evicted an entry.
    fn record_eviction(&self) {}

    /// Record a lookup that failed before reaching the store.
    fn record_miss(&self) {}
}

/// Mutating store operations.
pub trait StoreMut<K, V>: StoreCore<K, V> {
    /// Insert or update a value. Returns the previous value if present.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Remove a value by key. Removing an absent key is a no-op.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Remove all entries.
    fn clear(&mut self);
}
