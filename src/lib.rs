//! chaincache: an embeddable cache engine with chainable eviction policies.
//!
//! A [`Cache`](cache::Cache) owns a store, a policy chain, and a guard. The
//! chain decides which keys stay; each layer (FIFO, LIFO, LRU, MRU, LFU,
//! random, TTL) wraps an inner layer, so one cache can enforce a size bound
//! and a time bound at once.
//!
//! ```
//! use std::time::Duration;
//! use chaincache::prelude::*;
//!
//! let policy = LruPolicy::with_inner(1024, TtlPolicy::new(Duration::from_secs(300)));
//! let cache = Cache::new(policy);
//! cache.insert("user:1", 42u64);
//! assert_eq!(cache.get(&"user:1"), Ok(42));
//! ```

pub mod builder;
pub mod cache;
pub mod clock;
pub mod ds;
pub mod error;
pub mod guard;
pub mod policy;
pub mod prelude;
pub mod store;
