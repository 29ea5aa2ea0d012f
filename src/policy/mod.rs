//! Eviction policies and the layer-chaining contract.
//!
//! A policy holds only the bookkeeping needed to decide which keys stay
//! cached; it never sees values. Every policy is also a *layer*: it wraps an
//! inner policy (by default [`NoPolicy`]) and forwards every operation to it,
//! so several eviction criteria can be enforced by one cache.
//!
//! ## Architecture
//!
//! ```text
//!   LruPolicy<K, TtlPolicy<K, NoPolicy>>
//!
//!   ┌──────────────────┐     ┌──────────────────┐     ┌──────────┐
//!   │ LruPolicy (cap)  │ ──► │ TtlPolicy (age)  │ ──► │ NoPolicy │
//!   │ outermost layer  │     │ inner layer      │     │ identity │
//!   └──────────────────┘     └──────────────────┘     └──────────┘
//!
//!   insert(k):   inner.insert(k) ─► forget inner victims ─► own admission
//!                                   own victims also removed from inner
//!   expire():    inner.expire()  ─► forget inner victims ─► own expiry
//!   contains(k): own && inner
//!   touch(k):    inner.touch(k)  ─► own refresh
//! ```
//!
//! A key is live only while every layer tracks it. Each returned eviction
//! list names a key at most once, and the key being inserted appears in it
//! only when some layer refused to admit it (capacity 0).
//!
//! ## Layers
//!
//! | Layer          | Evicts on insert            | Access reorders | Expires passively |
//! |----------------|-----------------------------|-----------------|-------------------|
//! | `FifoPolicy`   | oldest insertion            | no              | no                |
//! | `LifoPolicy`   | newest surviving insertion  | no              | no                |
//! | `LruPolicy`    | least recently used         | yes             | no                |
//! | `MruPolicy`    | most recently used          | yes             | no                |
//! | `LfuPolicy`    | lowest access count         | counts          | no                |
//! | `RandomPolicy` | uniform random survivor     | no              | no                |
//! | `TtlPolicy`    | never (unbounded)           | refreshes       | yes               |
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::lru::LruPolicy;
//! use chaincache::policy::ttl::TtlPolicy;
//!
//! let mut policy = LruPolicy::with_inner(2, TtlPolicy::new(Duration::from_secs(60)));
//! assert!(policy.insert(&"a", &InsertOptions::default()).is_empty());
//! assert!(policy.insert(&"b", &InsertOptions::default()).is_empty());
//! assert_eq!(policy.insert(&"c", &InsertOptions::default()), vec!["a"]);
//! assert!(!policy.inner().contains(&"a"));
//! ```

use std::time::Duration;

pub mod fifo;
pub mod lfu;
pub mod lifo;
pub mod lru;
pub mod mru;
pub mod none;
pub mod random;
pub mod ttl;

pub use none::NoPolicy;

/// Per-insert parameters forwarded through the whole chain.
///
/// Only [`TtlPolicy`](ttl::TtlPolicy) reads them; every other layer passes
/// them on untouched. When both fields are set, `ttl` wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Explicit time-to-live for this key.
    pub ttl: Option<Duration>,
    /// Time-to-live for this key in milliseconds.
    pub max_age_ms: Option<u64>,
}

impl InsertOptions {
    /// Options with no overrides; every layer uses its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit time-to-live, taking priority over `max_age_ms`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the time-to-live in milliseconds.
    pub fn with_max_age_ms(mut self, max_age_ms: u64) -> Self {
        self.max_age_ms = Some(max_age_ms);
        self
    }

    /// Resolves the time-to-live: explicit duration, then milliseconds, then
    /// `default`.
    pub fn resolve_ttl(&self, default: Duration) -> Duration {
        self.ttl
            .or_else(|| self.max_age_ms.map(Duration::from_millis))
            .unwrap_or(default)
    }
}

/// Bookkeeping contract shared by every eviction layer.
///
/// Implementations must keep exactly one record per tracked key and must
/// forward every operation to their inner layer as described in the module
/// docs. The trait is object safe so chains can be assembled at runtime
/// (see [`CacheBuilder`](crate::builder::CacheBuilder)).
pub trait EvictionPolicy<K> {
    /// Number of keys tracked by this layer.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record counts of this layer and every inner layer, outermost first.
    /// The identity layer contributes nothing.
    fn layer_lens(&self) -> Vec<usize> {
        vec![self.len()]
    }

    /// Returns `true` if this layer and every inner layer track `key`.
    /// Never changes bookkeeping.
    fn contains(&self, key: &K) -> bool;

    /// Refreshes usage bookkeeping for `key` through the chain.
    ///
    /// Returns `false` if any layer does not know the key. Recency-tracking
    /// layers reorder here, so a logically read-only cache access mutates
    /// policy state.
    fn touch(&mut self, key: &K) -> bool;

    /// Admits `key`, returning every key evicted as a consequence.
    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K>;

    /// Drops bookkeeping for `key` here and in every inner layer. Returns
    /// whether this layer tracked it.
    fn remove(&mut self, key: &K) -> bool;

    /// Drops all bookkeeping here and in every inner layer.
    fn clear(&mut self);

    /// Returns every key that some layer decided is no longer valid, after
    /// dropping its bookkeeping.
    fn expire(&mut self) -> Vec<K>;
}

impl<K, P> EvictionPolicy<K> for Box<P>
where
    P: EvictionPolicy<K> + ?Sized,
{
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    #[inline]
    fn layer_lens(&self) -> Vec<usize> {
        (**self).layer_lens()
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        (**self).touch(key)
    }

    #[inline]
    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        (**self).insert(key, options)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> bool {
        (**self).remove(key)
    }

    #[inline]
    fn clear(&mut self) {
        (**self).clear()
    }

    #[inline]
    fn expire(&mut self) -> Vec<K> {
        (**self).expire()
    }
}

/// Rejects an admission: the key is reported evicted and any record the
/// inner layers created for it is dropped.
pub(crate) fn reject<K, C>(key: &K, inner: &mut C, evicted: &mut Vec<K>)
where
    K: Clone + PartialEq,
    C: EvictionPolicy<K>,
{
    inner.remove(key);
    if !evicted.contains(key) {
        evicted.push(key.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_layer_default() {
        let opts = InsertOptions::default();
        assert_eq!(opts.resolve_ttl(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn max_age_overrides_default() {
        let opts = InsertOptions::new().with_max_age_ms(250);
        assert_eq!(
            opts.resolve_ttl(Duration::from_secs(5)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn explicit_duration_wins_over_max_age() {
        let opts = InsertOptions::new()
            .with_max_age_ms(250)
            .with_ttl(Duration::from_secs(9));
        assert_eq!(opts.resolve_ttl(Duration::from_secs(5)), Duration::from_secs(9));
    }

    #[test]
    fn boxed_policy_forwards() {
        let mut policy: Box<dyn EvictionPolicy<u32>> = Box::new(lru::LruPolicy::new(1));
        assert!(policy.insert(&1, &InsertOptions::default()).is_empty());
        assert_eq!(policy.insert(&2, &InsertOptions::default()), vec![1]);
        assert_eq!(policy.len(), 1);
        assert!(policy.touch(&2));
        assert!(policy.remove(&2));
        assert!(policy.is_empty());
    }

    #[test]
    fn layer_lens_walk_the_chain() {
        let mut chain = lru::LruPolicy::with_inner(2, fifo::FifoPolicy::new(3));
        chain.inner_mut().insert(&9, &InsertOptions::default());
        chain.insert(&1, &InsertOptions::default());
        assert_eq!(chain.layer_lens(), vec![1, 2]);

        let boxed: Box<dyn EvictionPolicy<u32>> = Box::new(chain);
        assert_eq!(boxed.layer_lens(), vec![1, 2]);
        assert!(EvictionPolicy::<u32>::layer_lens(&NoPolicy).is_empty());
    }
}
