//! Mutual-exclusion strategies for [`Cache`](crate::cache::Cache).
//!
//! A guard decides how the cache's internal state is wrapped. Every cache
//! operation runs as a single closure over that state, so one acquisition
//! covers lazy expiration, policy bookkeeping, and store mutation together.
//!
//! | Guard       | Cell                  | Cache is `Sync` | Use                  |
//! |-------------|-----------------------|-----------------|----------------------|
//! | `NoLock`    | `RefCell<T>`          | no              | single-threaded      |
//! | `MutexLock` | `parking_lot::Mutex`  | yes             | shared across threads|
//!
//! Operations are not re-entrant: a closure passed to a cache method (for
//! example [`Cache::get_with`](crate::cache::Cache::get_with)) must not call
//! back into the same cache. With `NoLock` that panics; with `MutexLock` it
//! deadlocks.

use std::cell::RefCell;

/// Wraps cache state behind some form of exclusive access.
pub trait Guard {
    /// Container holding the guarded state.
    type Cell<T>;

    fn new_cell<T>(value: T) -> Self::Cell<T>;

    /// Runs `f` with exclusive access to the cell's contents.
    fn with<T, R>(cell: &Self::Cell<T>, f: impl FnOnce(&mut T) -> R) -> R;

    fn into_inner<T>(cell: Self::Cell<T>) -> T;
}

/// No synchronization. The cache stays `Send` but is not `Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl Guard for NoLock {
    type Cell<T> = RefCell<T>;

    #[inline]
    fn new_cell<T>(value: T) -> RefCell<T> {
        RefCell::new(value)
    }

    #[inline]
    fn with<T, R>(cell: &RefCell<T>, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut cell.borrow_mut())
    }

    #[inline]
    fn into_inner<T>(cell: RefCell<T>) -> T {
        cell.into_inner()
    }
}

/// Serializes every cache operation behind a [`parking_lot::Mutex`].
#[cfg(feature = "concurrency")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MutexLock;

#[cfg(feature = "concurrency")]
impl Guard for MutexLock {
    type Cell<T> = parking_lot::Mutex<T>;

    #[inline]
    fn new_cell<T>(value: T) -> parking_lot::Mutex<T> {
        parking_lot::Mutex::new(value)
    }

    #[inline]
    fn with<T, R>(cell: &parking_lot::Mutex<T>, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut cell.lock())
    }

    #[inline]
    fn into_inner<T>(cell: parking_lot::Mutex<T>) -> T {
        cell.into_inner()
    }
}
