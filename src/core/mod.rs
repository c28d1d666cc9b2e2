//! Core types shared by every stage of the pipeline
//!
//! This module contains the fixed-width value types (lanes, nonces, headers,
//! targets) and the little-endian codec that moves them in and out of bytes.

pub mod codec;
mod header;
mod lane;
mod nonce;
mod target;

pub use header::Header;
pub use lane::HashLane;
pub use nonce::Nonce;
pub use target::Target;

/// Constants of the Ethash algorithm
pub mod constants {
    /// Bytes in a word
    pub const WORD_BYTES: usize = 4;

    /// Bytes in a hash lane (Keccak-512 output)
    pub const HASH_BYTES: usize = 64;

    /// Words in a hash lane
    pub const LANE_WORDS: usize = HASH_BYTES / WORD_BYTES;

    /// Width of the hashimoto mix in bytes
    pub const MIX_BYTES: usize = 128;

    /// Words in the hashimoto mix
    pub const MIX_WORDS: usize = MIX_BYTES / WORD_BYTES;

    /// Lanes fetched per hashimoto access
    pub const MIX_LANES: usize = MIX_BYTES / HASH_BYTES;

    /// Parents mixed into each dataset item
    pub const DATASET_PARENTS: u32 = 256;

    /// RandMemoHash rounds during cache production
    pub const CACHE_ROUNDS: usize = 3;

    /// Dataset accesses in the hashimoto loop
    pub const ACCESSES: u32 = 64;

    /// Size of a nonce in bytes
    pub const NONCE_SIZE: usize = 8;

    /// Size of a seed, mix digest or result hash in bytes
    pub const DIGEST_SIZE: usize = 32;

    /// Default header size used by the driver (508 bytes plus five 8-byte fields)
    pub const DEFAULT_HEADER_SIZE: usize = 508 + 8 * 5;
}


#[cfg(test)]
mod tests_property;
