//! Cache construction
//!
//! The cache is a sequential Keccak-512 chain over the seed followed by
//! `CACHE_ROUNDS` passes of RandMemoHash. Each pass rewrites the lanes in
//! place, so lane `j` of a round sees lanes `< j` already rewritten by the
//! same round. Neither stage can be parallelized.

use crate::core::constants::{CACHE_ROUNDS, DIGEST_SIZE, HASH_BYTES};
use crate::core::{codec, HashLane};
use crate::error::{Error, Result};
use crate::ethash::keccak::{keccak_512, keccak_512_lane};
use crate::utils::format_duration;
use std::ops::Index;
use std::time::Instant;
use tracing::{debug, info};

/// Read-only cache of `cache_size / 64` lanes derived from a seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cache {
    lanes: Vec<HashLane>,
}

impl Cache {
    /// Wrap pre-computed lanes
    pub fn from_lanes(lanes: Vec<HashLane>) -> Result<Self> {
        if lanes.is_empty() {
            return Err(Error::invalid_size("Cache must contain at least one lane"));
        }
        Ok(Self { lanes })
    }

    /// Number of lanes
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether the cache holds no lanes (never true for a built cache)
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.lanes.len() * HASH_BYTES
    }

    /// Borrow the lanes
    pub fn lanes(&self) -> &[HashLane] {
        &self.lanes
    }

    /// Serialize the cache in lane order
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::lanes_to_bytes(&self.lanes)
    }
}

impl Index<usize> for Cache {
    type Output = HashLane;

    fn index(&self, index: usize) -> &HashLane {
        &self.lanes[index]
    }
}

/// Build the cache for `cache_size` bytes from a 32-byte seed
pub fn build_cache(cache_size: usize, seed: &[u8; DIGEST_SIZE]) -> Result<Cache> {
    if cache_size == 0 || cache_size % HASH_BYTES != 0 {
        return Err(Error::invalid_size(format!(
            "Cache size {} is not a positive multiple of {}",
            cache_size, HASH_BYTES
        )));
    }

    let n = cache_size / HASH_BYTES;
    let started = Instant::now();
    info!(cache_size, lanes = n, "Building cache");

    let mut lanes = Vec::with_capacity(n);
    let mut previous = keccak_512(seed);
    lanes.push(previous);
    for _ in 1..n {
        previous = keccak_512_lane(&previous);
        lanes.push(previous);
    }

    for round in 0..CACHE_ROUNDS {
        for j in 0..n {
            let v = lanes[j][0] as usize % n;
            let mixed = lanes[(j + n - 1) % n] ^ lanes[v];
            lanes[j] = keccak_512_lane(&mixed);
        }
        debug!(round, "Cache round complete");
    }

    info!(
        elapsed = %format_duration(started.elapsed()),
        "Cache ready"
    );
    Ok(Cache { lanes })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [0u8; 32];

    #[test]
    fn test_cache_golden_lanes() {
        let cache = build_cache(1024, &SEED).unwrap();
        assert_eq!(cache.len(), 16);
        assert_eq!(cache.size(), 1024);
        assert_eq!(
            cache[0].to_hex(),
            "7ce2991c951f7bf4c4c1bb119887ee07871eb5339d7b97b8588e85c742de90e5\
             bafd5bbe6ce93a134fb6be9ad3e30db99d9528a2ea7846833f52e9ca119b6b54"
        );
        assert_eq!(
            cache[15].to_hex(),
            "845f64fd8324bb85312979dead74f764c9677aab89801ad4f927f1c00f12e28f\
             22422bb44200d1969d9ab377dd6b099dc6dbc3222e9321b2c1e84f8e2f07731c"
        );
    }

    #[test]
    fn test_cache_is_deterministic() {
        let a = build_cache(2048, &SEED).unwrap();
        let b = build_cache(2048, &SEED).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_cache_depends_on_seed() {
        let mut other = SEED;
        other[31] = 1;
        let a = build_cache(1024, &SEED).unwrap();
        let b = build_cache(1024, &other).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_single_lane_cache() {
        // One lane: every round mixes the lane with itself, giving keccak(0)
        let cache = build_cache(64, &SEED).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache[0], keccak_512(&[0u8; 64]));
    }

    #[test]
    fn test_invalid_cache_size() {
        assert!(matches!(build_cache(0, &SEED), Err(Error::InvalidSize(_))));
        assert!(matches!(build_cache(100, &SEED), Err(Error::InvalidSize(_))));
        assert!(Cache::from_lanes(Vec::new()).is_err());
    }
}
