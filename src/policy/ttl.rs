//! Time-to-live eviction layer.
//!
//! Each key carries a deadline. The layer never evicts on `insert`; keys leave
//! only through [`expire`](EvictionPolicy::expire), which the cache runs at the
//! start of every operation. There is no background timer.
//!
//! ## Architecture
//!
//! ```text
//!   entries: FxHashMap<K, Lifetime>
//!   ┌───────┬──────────────────────────────────────────┐
//!   │  Key  │ start      duration     deadline         │
//!   ├───────┼──────────────────────────────────────────┤
//!   │  "a"  │ t0         60s          t0 + 60s         │
//!   │  "b"  │ t3         250ms        t3 + 250ms       │
//!   └───────┴──────────────────────────────────────────┘
//!
//!   insert(k, opts): duration = opts.ttl ▸ opts.max_age_ms ▸ default
//!                    start = now, deadline = now + duration
//!   touch(k):        start = now, deadline = now + existing duration
//!   expire():        every key with deadline < now
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use chaincache::clock::ManualClock;
//! use chaincache::policy::{EvictionPolicy, InsertOptions};
//! use chaincache::policy::ttl::TtlPolicy;
//!
//! let clock = ManualClock::new();
//! let mut ttl = TtlPolicy::with_clock(Duration::from_secs(10), clock.clone());
//! ttl.insert(&"session", &InsertOptions::default());
//! ttl.insert(&"token", &InsertOptions::new().with_ttl(Duration::from_secs(1)));
//!
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(ttl.expire(), vec!["token"]);
//! assert!(ttl.contains(&"session"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy};

#[derive(Debug, Clone, Copy)]
struct Lifetime {
    start: Instant,
    duration: Duration,
    /// `None` when `start + duration` is not representable.
    deadline: Option<Instant>,
}

impl Lifetime {
    fn starting_at(start: Instant, duration: Duration) -> Self {
        Self {
            start,
            duration,
            deadline: start.checked_add(duration),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }
}

/// Expires keys whose deadline has passed. Unbounded in size.
pub struct TtlPolicy<K, C = NoPolicy, T = SystemClock> {
    entries: FxHashMap<K, Lifetime>,
    default_max_age: Duration,
    clock: T,
    inner: C,
}

impl<K> TtlPolicy<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a standalone TTL layer on the system clock.
    ///
    /// A zero `max_age` is honored: keys inserted without an override expire
    /// as soon as the clock moves.
    pub fn new(max_age: Duration) -> Self {
        Self::from_parts(max_age, NoPolicy, SystemClock)
    }

    /// Creates a standalone TTL layer, rejecting a zero `max_age`.
    pub fn try_new(max_age: Duration) -> Result<Self, ConfigError> {
        if max_age.is_zero() {
            return Err(ConfigError::new("ttl max age must be greater than zero"));
        }
        Ok(Self::new(max_age))
    }
}

impl<K, C> TtlPolicy<K, C>
where
    K: Clone + Eq + Hash,
{
    /// Creates a TTL layer on the system clock wrapping `inner`.
    pub fn with_inner(max_age: Duration, inner: C) -> Self {
        Self::from_parts(max_age, inner, SystemClock)
    }
}

impl<K, T> TtlPolicy<K, NoPolicy, T>
where
    K: Clone + Eq + Hash,
    T: Clock,
{
    /// Creates a standalone TTL layer reading time from `clock`.
    pub fn with_clock(max_age: Duration, clock: T) -> Self {
        Self::from_parts(max_age, NoPolicy, clock)
    }
}

impl<K, C, T> TtlPolicy<K, C, T>
where
    K: Clone + Eq + Hash,
    T: Clock,
{
    pub fn from_parts(max_age: Duration, inner: C, clock: T) -> Self {
        Self {
            entries: FxHashMap::default(),
            default_max_age: max_age,
            clock,
            inner,
        }
    }

    /// Max-age applied when an insert carries no override.
    pub fn default_max_age(&self) -> Duration {
        self.default_max_age
    }

    /// Time left before `key` expires, or `None` if the key is untracked.
    ///
    /// Returns `Duration::ZERO` for a key past its deadline that has not been
    /// expired yet.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        let lifetime = self.entries.get(key)?;
        Some(match lifetime.deadline {
            Some(deadline) => deadline.saturating_duration_since(self.clock.now()),
            None => Duration::MAX,
        })
    }

    /// Instant the key's current lifetime began (its admission or last touch).
    pub fn started_at(&self, key: &K) -> Option<Instant> {
        self.entries.get(key).map(|lifetime| lifetime.start)
    }

    /// Duration the key was last admitted with.
    pub fn lifetime_of(&self, key: &K) -> Option<Duration> {
        self.entries.get(key).map(|lifetime| lifetime.duration)
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<K, C, T> EvictionPolicy<K> for TtlPolicy<K, C, T>
where
    K: Clone + Eq + Hash,
    C: EvictionPolicy<K>,
    T: Clock,
{
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn layer_lens(&self) -> Vec<usize> {
        let mut lens = vec![self.len()];
        lens.extend(self.inner.layer_lens());
        lens
    }

    /// Checks the record only; a key past its deadline stays visible until
    /// the next `expire`.
    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key) && self.inner.contains(key)
    }

    fn touch(&mut self, key: &K) -> bool {
        if !self.inner.touch(key) {
            return false;
        }
        let now = self.clock.now();
        match self.entries.get_mut(key) {
            Some(lifetime) => {
                *lifetime = Lifetime::starting_at(now, lifetime.duration);
                true
            },
            None => false,
        }
    }

    fn insert(&mut self, key: &K, options: &InsertOptions) -> Vec<K> {
        let evicted = self.inner.insert(key, options);
        for victim in &evicted {
            self.entries.remove(victim);
        }
        if evicted.contains(key) {
            return evicted;
        }

        let duration = options.resolve_ttl(self.default_max_age);
        let lifetime = Lifetime::starting_at(self.clock.now(), duration);
        self.entries.insert(key.clone(), lifetime);
        evicted
    }

    fn remove(&mut self, key: &K) -> bool {
        self.inner.remove(key);
        self.entries.remove(key).is_some()
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.entries.clear();
    }

    fn expire(&mut self) -> Vec<K> {
        let mut expired = self.inner.expire();
        for key in &expired {
            self.entries.remove(key);
        }

        let now = self.clock.now();
        let own: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, lifetime)| lifetime.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in own {
            self.entries.remove(&key);
            self.inner.remove(&key);
            expired.push(key);
        }
        expired
    }
}

impl<K, C, T> fmt::Debug for TtlPolicy<K, C, T>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlPolicy")
            .field("default_max_age", &self.default_max_age)
            .field("len", &self.entries.len())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
