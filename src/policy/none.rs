//! Identity layer that terminates every policy chain.
//!
//! `NoPolicy` tracks nothing and evicts nothing. It answers `true` to
//! `contains` and `touch` so that it never vetoes the "every layer agrees"
//! rule of the layers wrapping it.

use crate::policy::{EvictionPolicy, InsertOptions};

/// The no-op base case of a policy chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPolicy;

impl<K> EvictionPolicy<K> for NoPolicy {
    #[inline]
    fn len(&self) -> usize {
        0
    }

    fn layer_lens(&self) -> Vec<usize> {
        Vec::new()
    }

    #[inline]
    fn contains(&self, _key: &K) -> bool {
        true
    }

    #[inline]
    fn touch(&mut self, _key: &K) -> bool {
        true
    }

    #[inline]
    fn insert(&mut self, _key: &K, _options: &InsertOptions) -> Vec<K> {
        Vec::new()
    }

    #[inline]
    fn remove(&mut self, _key: &K) -> bool {
        false
    }

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn expire(&mut self) -> Vec<K> {
        Vec::new()
    }
}
