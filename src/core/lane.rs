//! Hash lane: the 64-byte unit of cache and dataset storage

use crate::core::constants::{HASH_BYTES, LANE_WORDS};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::ops::{BitXor, Index, IndexMut};

/// Sixteen 32-bit words produced by Keccak-512 or the mixing functions
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashLane(pub [u32; LANE_WORDS]);

impl HashLane {
    /// Create a lane from its words
    pub const fn new(words: [u32; LANE_WORDS]) -> Self {
        Self(words)
    }

    /// Decode 64 little-endian bytes
    pub fn from_le_bytes(bytes: &[u8; HASH_BYTES]) -> Self {
        Self::from_le_slice(bytes)
    }

    /// Decode a slice that is known to be exactly 64 bytes long
    pub(crate) fn from_le_slice(bytes: &[u8]) -> Self {
        let mut words = [0u32; LANE_WORDS];
        LittleEndian::read_u32_into(bytes, &mut words);
        Self(words)
    }

    /// Encode as 64 little-endian bytes
    pub fn to_le_bytes(&self) -> [u8; HASH_BYTES] {
        let mut bytes = [0u8; HASH_BYTES];
        LittleEndian::write_u32_into(&self.0, &mut bytes);
        bytes
    }

    /// Borrow the words
    pub fn words(&self) -> &[u32; LANE_WORDS] {
        &self.0
    }

    /// Mutably borrow the words
    pub fn words_mut(&mut self) -> &mut [u32; LANE_WORDS] {
        &mut self.0
    }

    /// Hex representation of the little-endian bytes
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_le_bytes())
    }
}

impl BitXor for HashLane {
    type Output = HashLane;

    fn bitxor(self, rhs: HashLane) -> HashLane {
        let mut out = self;
        for (word, other) in out.0.iter_mut().zip(rhs.0.iter()) {
            *word ^= other;
        }
        out
    }
}

impl Index<usize> for HashLane {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for HashLane {
    fn index_mut(&mut self, index: usize) -> &mut u32 {
        &mut self.0[index]
    }
}

impl fmt::Debug for HashLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashLane").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for HashLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
