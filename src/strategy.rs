//! Key strategies: how a table hashes and compares raw key blocks.
//!
//! A strategy is fixed when the table is set up and travels with it through
//! copy, move and swap. Every key handed to a strategy is exactly
//! `key_size` bytes long.

use core::fmt;
use core::hash::BuildHasher;

/// Hash-and-equals capability injected into a table at setup.
///
/// `equal` must be consistent with `hash`: keys that compare equal must hash
/// equally, or lookups will miss entries stored under another chain.
pub trait KeyStrategy {
    fn hash(&self, key: &[u8]) -> u64;

    fn equal(&self, a: &[u8], b: &[u8]) -> bool {
        a == b
    }
}

/// Running multiplicative hash over the raw bytes: seed 5381, then
/// `h = h * 33 ^ byte` for every byte, wrapping on overflow.
///
/// Deterministic and order-sensitive. Not suitable for untrusted keys.
#[inline]
pub fn byte_hash(key: &[u8]) -> u64 {
    key.iter()
        .fold(5381u64, |h, &b| (h << 5).wrapping_add(h) ^ u64::from(b))
}

/// Default strategy: [`byte_hash`] plus byte-wise equality.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ByteStrategy;

impl KeyStrategy for ByteStrategy {
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        byte_hash(key)
    }
}

/// Strategy assembled from a hash function and an equality function.
///
/// Useful for keys that are not byte-comparable, e.g. blocks carrying
/// padding that must be ignored.
#[derive(Clone)]
pub struct FnStrategy<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> FnStrategy<H, E>
where
    H: Fn(&[u8]) -> u64,
    E: Fn(&[u8], &[u8]) -> bool,
{
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<H, E> KeyStrategy for FnStrategy<H, E>
where
    H: Fn(&[u8]) -> u64,
    E: Fn(&[u8], &[u8]) -> bool,
{
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn equal(&self, a: &[u8], b: &[u8]) -> bool {
        (self.eq)(a, b)
    }
}

impl<H, E> fmt::Debug for FnStrategy<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStrategy").finish_non_exhaustive()
    }
}

/// Adapts any [`BuildHasher`] as the hash half of a strategy. Equality
/// stays byte-wise.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherStrategy<S>(pub S);

impl<S: BuildHasher> KeyStrategy for BuildHasherStrategy<S> {
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        self.0.hash_one(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    /// Invariant: the empty key hashes to the seed; known inputs give fixed values.
    #[test]
    fn byte_hash_known_values() {
        assert_eq!(byte_hash(&[]), 5381);
        assert_eq!(byte_hash(b"a"), 177_604);
        assert_eq!(byte_hash(b"ab"), 5_860_902);
        assert_eq!(byte_hash(&[0xff, 0x00, 0x80]), 193_295_194);
    }

    /// Invariant: the hash is order-sensitive.
    #[test]
    fn byte_hash_is_order_sensitive() {
        assert_ne!(byte_hash(&[1, 2, 3, 4]), byte_hash(&[4, 3, 2, 1]));
    }

    /// Invariant: long keys wrap instead of overflowing.
    #[test]
    fn byte_hash_wraps_on_long_input() {
        let key = [0xabu8; 4096];
        let _ = byte_hash(&key);
    }

    #[test]
    fn default_equality_is_bytewise() {
        let s = ByteStrategy;
        assert!(s.equal(&[1, 2], &[1, 2]));
        assert!(!s.equal(&[1, 2], &[2, 1]));
    }

    /// Invariant: a function strategy calls back into the supplied closures.
    #[test]
    fn fn_strategy_uses_supplied_functions() {
        // Only the first byte is significant.
        let s = FnStrategy::new(|k: &[u8]| u64::from(k[0]), |a: &[u8], b: &[u8]| a[0] == b[0]);
        assert_eq!(s.hash(&[7, 1, 2]), 7);
        assert!(s.equal(&[7, 1, 2], &[7, 9, 9]));
        assert!(!s.equal(&[7, 1, 2], &[8, 1, 2]));
    }

    #[test]
    fn build_hasher_strategy_is_stable_per_instance() {
        let s = BuildHasherStrategy(RandomState::new());
        assert_eq!(s.hash(b"key"), s.hash(b"key"));
        let cloned = s.clone();
        assert_eq!(s.hash(b"key"), cloned.hash(b"key"));
    }
}
