//! Error types for the chaincache library.
//!
//! ## Key Components
//!
//! - [`KeyNotFound`]: Returned by [`Cache::get`](crate::cache::Cache::get) when
//!   the key is absent after lazy expiration.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity, zero max-age, empty policy chain).
//! - [`InvariantError`]: Returned when the store and the policy chain disagree
//!   about which keys are live.
//!
//! ## Example Usage
//!
//! ```
//! use chaincache::cache::Cache;
//! use chaincache::error::{ConfigError, KeyNotFound};
//! use chaincache::policy::lru::LruPolicy;
//!
//! let cache = Cache::new(LruPolicy::new(2));
//! assert_eq!(cache.get(&1u32), Err::<String, _>(KeyNotFound));
//!
//! // Fallible constructor for user-configurable parameters
//! let bad: Result<LruPolicy<u32>, ConfigError> = LruPolicy::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// KeyNotFound
// ---------------------------------------------------------------------------

/// Error returned when a key is not live in the cache.
///
/// This is the only condition a cache lookup raises; the boolean and
/// `Option`-returning queries (`contains`, `touch`, `try_get`) report absence
/// without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("element not present in the cache")
    }
}

impl std::error::Error for KeyNotFound {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruPolicy::try_new`](crate::policy::lru::LruPolicy::try_new) and by
/// [`CacheBuilder::build`](crate::builder::CacheBuilder::build). Carries a
/// human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use chaincache::policy::fifo::FifoPolicy;
///
/// let err = FifoPolicy::<u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the store and the policy chain disagree.
///
/// Produced by [`Cache::check_invariants`](crate::cache::Cache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
