//! Nonce type for the hashimoto search

use crate::core::codec;
use crate::core::constants::NONCE_SIZE;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 64-bit nonce appended to the header before hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Nonce(pub u64);

impl Nonce {
    /// Create a new Nonce
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Draw a nonce uniformly at random
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Get the inner value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Advance by one, wrapping at 2^64
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Offset by `n`, wrapping at 2^64
    pub fn wrapping_add(self, n: u64) -> Self {
        Self(self.0.wrapping_add(n))
    }

    /// Little-endian encoding used in the hashimoto seed
    pub fn to_le_bytes(self) -> [u8; NONCE_SIZE] {
        codec::nonce_to_bytes(self.0)
    }

    /// Decode from exactly eight little-endian bytes
    pub fn from_le_slice(bytes: &[u8]) -> Result<Self> {
        codec::bytes_to_nonce(bytes).map(Self)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Nonce> for u64 {
    fn from(nonce: Nonce) -> Self {
        nonce.0
    }
}
