//! Epoch sizing and seed selection
//!
//! Sizes grow linearly per epoch and are rounded down until the lane (or mix
//! page) count is prime.

use crate::core::constants::{DIGEST_SIZE, HASH_BYTES, MIX_BYTES};
use crate::error::{Error, Result};
use std::fmt;

/// Blocks per epoch
pub const EPOCH_LENGTH: u64 = 30_000;

const CACHE_BYTES_INIT: u64 = 1 << 24;
const CACHE_BYTES_GROWTH: u64 = 1 << 17;
const DATASET_BYTES_INIT: u64 = 1 << 30;
const DATASET_BYTES_GROWTH: u64 = 1 << 23;

/// Epoch containing `block_number`
pub fn epoch_of(block_number: u64) -> u64 {
    block_number / EPOCH_LENGTH
}

/// Cache size in bytes for `epoch`
pub fn cache_size(epoch: u64) -> Result<u64> {
    prime_rounded_size(CACHE_BYTES_INIT, CACHE_BYTES_GROWTH, epoch, HASH_BYTES as u64)
        .ok_or_else(|| Error::invalid_size(format!("Cache size for epoch {} overflows", epoch)))
}

/// Dataset size in bytes for `epoch`
pub fn full_size(epoch: u64) -> Result<u64> {
    prime_rounded_size(DATASET_BYTES_INIT, DATASET_BYTES_GROWTH, epoch, MIX_BYTES as u64)
        .ok_or_else(|| Error::invalid_size(format!("Dataset size for epoch {} overflows", epoch)))
}

/// `init + growth * epoch - unit`, stepped down until `size / unit` is prime
fn prime_rounded_size(init: u64, growth: u64, epoch: u64, unit: u64) -> Option<u64> {
    let mut size = growth
        .checked_mul(epoch)?
        .checked_add(init)?
        .checked_sub(unit)?;
    while !is_prime(size / unit) {
        size = size.checked_sub(2 * unit)?;
    }
    Some(size)
}

/// Trial-division primality test
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// 32-byte seed the cache is derived from
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EpochSeed(pub [u8; DIGEST_SIZE]);

impl EpochSeed {
    /// Seed of the genesis epoch (all zero)
    pub const fn genesis() -> Self {
        Self([0u8; DIGEST_SIZE])
    }

    /// Seed for the epoch containing `block_number`
    ///
    /// Only the genesis epoch is supported; later epochs would need the
    /// iterated seed hash chain.
    pub fn for_block(block_number: u64) -> Result<Self> {
        match epoch_of(block_number) {
            0 => Ok(Self::genesis()),
            epoch => Err(Error::UnsupportedEpoch(epoch)),
        }
    }

    /// Borrow the seed bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EpochSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EpochSeed({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_of() {
        assert_eq!(epoch_of(0), 0);
        assert_eq!(epoch_of(29_999), 0);
        assert_eq!(epoch_of(30_000), 1);
    }

    #[test]
    fn test_epoch_sizes() {
        assert_eq!(cache_size(0).unwrap(), 16_776_896);
        assert_eq!(full_size(0).unwrap(), 1_073_739_904);
        assert_eq!(cache_size(1).unwrap(), 16_907_456);
        assert_eq!(full_size(1).unwrap(), 1_082_130_304);
    }

    #[test]
    fn test_sizes_are_aligned() {
        for epoch in 0..4 {
            let cache = cache_size(epoch).unwrap();
            let full = full_size(epoch).unwrap();
            assert_eq!(cache % HASH_BYTES as u64, 0);
            assert_eq!(full % MIX_BYTES as u64, 0);
            assert!(is_prime(cache / HASH_BYTES as u64));
        }
    }

    #[test]
    fn test_oversized_epoch_is_rejected() {
        let epoch = epoch_of(u64::MAX);
        assert!(matches!(cache_size(epoch), Err(Error::InvalidSize(_))));
        assert!(matches!(full_size(epoch), Err(Error::InvalidSize(_))));
        assert!(matches!(full_size(u64::MAX), Err(Error::InvalidSize(_))));
    }

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_seed_for_block() {
        assert_eq!(EpochSeed::for_block(12_345).unwrap(), EpochSeed::genesis());
        assert_eq!(EpochSeed::genesis().as_bytes(), &[0u8; 32]);
        assert!(matches!(
            EpochSeed::for_block(60_000),
            Err(Error::UnsupportedEpoch(2))
        ));
    }
}
