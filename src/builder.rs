//! Runtime cache configuration.
//!
//! Static chains such as `LruPolicy<K, TtlPolicy<K>>` are fastest, but their
//! shape is fixed at compile time. [`CacheBuilder`] assembles the same chains
//! from a list of [`CachePolicy`] values, validating parameters and boxing
//! each layer.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use chaincache::builder::{CacheBuilder, CachePolicy};
//!
//! let cache = CacheBuilder::new()
//!     .layer(CachePolicy::Lru { capacity: 100 })
//!     .layer(CachePolicy::Ttl { max_age: Duration::from_secs(30) })
//!     .build::<u64, String>()
//!     .unwrap();
//!
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Ok("hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::cache::Cache;
use crate::clock::{SharedClock, SystemClock};
use crate::error::ConfigError;
use crate::policy::fifo::FifoPolicy;
use crate::policy::lfu::LfuPolicy;
use crate::policy::lifo::LifoPolicy;
use crate::policy::lru::LruPolicy;
use crate::policy::mru::MruPolicy;
use crate::policy::random::RandomPolicy;
use crate::policy::ttl::TtlPolicy;
use crate::policy::{EvictionPolicy, NoPolicy};
use crate::store::hashmap::HashMapStore;

#[cfg(feature = "concurrency")]
use crate::guard::MutexLock;

/// A policy chain assembled at runtime.
pub type DynPolicy<K> = Box<dyn EvictionPolicy<K> + Send>;

/// One layer of a runtime-built chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachePolicy {
    /// First In, First Out eviction.
    Fifo { capacity: usize },
    /// Last In, First Out eviction.
    Lifo { capacity: usize },
    /// Least Recently Used eviction.
    Lru { capacity: usize },
    /// Most Recently Used eviction.
    Mru { capacity: usize },
    /// Least Frequently Used eviction, least recent first among equal counts.
    Lfu { capacity: usize },
    /// Uniform random eviction; `seed` makes victims reproducible.
    Random { capacity: usize, seed: Option<u64> },
    /// Time-to-live expiry with a default max-age.
    Ttl { max_age: Duration },
}

impl CachePolicy {
    fn name(&self) -> &'static str {
        match self {
            Self::Fifo { .. } => "fifo",
            Self::Lifo { .. } => "lifo",
            Self::Lru { .. } => "lru",
            Self::Mru { .. } => "mru",
            Self::Lfu { .. } => "lfu",
            Self::Random { .. } => "random",
            Self::Ttl { .. } => "ttl",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Fifo { capacity }
            | Self::Lifo { capacity }
            | Self::Lru { capacity }
            | Self::Mru { capacity }
            | Self::Lfu { capacity }
            | Self::Random { capacity, .. }
                if capacity == 0 =>
            {
                Err(ConfigError::new(format!(
                    "{} capacity must be greater than zero",
                    self.name()
                )))
            },
            Self::Ttl { max_age } if max_age.is_zero() => Err(ConfigError::new(
                "ttl max age must be greater than zero",
            )),
            _ => Ok(()),
        }
    }

    /// Wraps `inner` in this layer.
    fn wrap<K>(&self, inner: DynPolicy<K>, clock: &SharedClock) -> DynPolicy<K>
    where
        K: Clone + Eq + Hash + Send + 'static,
    {
        match *self {
            Self::Fifo { capacity } => Box::new(FifoPolicy::with_inner(capacity, inner)),
            Self::Lifo { capacity } => Box::new(LifoPolicy::with_inner(capacity, inner)),
            Self::Lru { capacity } => Box::new(LruPolicy::with_inner(capacity, inner)),
            Self::Mru { capacity } => Box::new(MruPolicy::with_inner(capacity, inner)),
            Self::Lfu { capacity } => Box::new(LfuPolicy::with_inner(capacity, inner)),
            Self::Random { capacity, seed } => {
                let rng = match seed {
                    Some(seed) => SmallRng::seed_from_u64(seed),
                    None => SmallRng::from_os_rng(),
                };
                Box::new(RandomPolicy::from_parts(capacity, inner, rng))
            },
            Self::Ttl { max_age } => {
                Box::new(TtlPolicy::from_parts(max_age, inner, Arc::clone(clock)))
            },
        }
    }
}

/// Builder for caches with a runtime-configured policy chain.
pub struct CacheBuilder {
    layers: Vec<CachePolicy>,
    clock: SharedClock,
    store_capacity: usize,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            clock: Arc::new(SystemClock),
            store_capacity: 0,
        }
    }

    /// Appends a layer. The first layer added is the outermost.
    pub fn layer(mut self, policy: CachePolicy) -> Self {
        self.layers.push(policy);
        self
    }

    /// Sets the time source for every TTL layer.
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Presizes the backing store.
    pub fn store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }

    pub fn layers(&self) -> &[CachePolicy] {
        &self.layers
    }

    /// Validates the layers and assembles the chain, innermost first.
    pub fn build_policy<K>(&self) -> Result<DynPolicy<K>, ConfigError>
    where
        K: Clone + Eq + Hash + Send + 'static,
    {
        if self.layers.is_empty() {
            return Err(ConfigError::new("at least one policy layer is required"));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        let base: DynPolicy<K> = Box::new(NoPolicy);
        Ok(self
            .layers
            .iter()
            .rev()
            .fold(base, |inner, layer| layer.wrap(inner, &self.clock)))
    }

    /// Builds a single-threaded cache.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chaincache::builder::{CacheBuilder, CachePolicy};
    ///
    /// let err = CacheBuilder::new()
    ///     .layer(CachePolicy::Fifo { capacity: 0 })
    ///     .build::<u64, u64>()
    ///     .err().unwrap();
    /// assert!(err.message().contains("fifo"));
    /// ```
    pub fn build<K, V>(self) -> Result<Cache<K, V, DynPolicy<K>>, ConfigError>
    where
        K: Clone + Eq + Hash + Send + 'static,
    {
        let policy = self.build_policy::<K>()?;
        let store = HashMapStore::with_capacity(self.store_capacity);
        Ok(Cache::with_store(policy, store))
    }

    /// Builds a cache guarded by a mutex, shareable across threads.
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<K, V>(
        self,
    ) -> Result<Cache<K, V, DynPolicy<K>, HashMapStore<K, V>, MutexLock>, ConfigError>
    where
        K: Clone + Eq + Hash + Send + 'static,
    {
        let policy = self.build_policy::<K>()?;
        let store = HashMapStore::with_capacity(self.store_capacity);
        Ok(Cache::concurrent_with_store(policy, store))
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("layers", &self.layers)
            .field("store_capacity", &self.store_capacity)
            .finish_non_exhaustive()
    }
}
