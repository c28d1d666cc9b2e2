//! Fixed-width little-endian codec
//!
//! Every integer that enters hashed material goes through these functions.
//! Widths never vary with the value: zero encodes to four (or eight) zero
//! bytes like any other word.

use crate::core::constants::{HASH_BYTES, NONCE_SIZE, WORD_BYTES};
use crate::core::HashLane;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Decode exactly four bytes as a little-endian word
pub fn bytes_to_word(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != WORD_BYTES {
        return Err(Error::format(format!(
            "Expected {} bytes for a word, got {}",
            WORD_BYTES,
            bytes.len()
        )));
    }
    Ok(LittleEndian::read_u32(bytes))
}

/// Encode a word as four little-endian bytes
pub fn word_to_bytes(word: u32) -> [u8; WORD_BYTES] {
    let mut out = [0u8; WORD_BYTES];
    LittleEndian::write_u32(&mut out, word);
    out
}

/// Encode a nonce as eight little-endian bytes
pub fn nonce_to_bytes(nonce: u64) -> [u8; NONCE_SIZE] {
    let mut out = [0u8; NONCE_SIZE];
    LittleEndian::write_u64(&mut out, nonce);
    out
}

/// Decode exactly eight bytes as a little-endian nonce
pub fn bytes_to_nonce(bytes: &[u8]) -> Result<u64> {
    if bytes.len() != NONCE_SIZE {
        return Err(Error::format(format!(
            "Expected {} bytes for a nonce, got {}",
            NONCE_SIZE,
            bytes.len()
        )));
    }
    Ok(LittleEndian::read_u64(bytes))
}

/// Reinterpret a buffer as little-endian words
pub fn bytes_to_words(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % WORD_BYTES != 0 {
        return Err(Error::format(format!(
            "Buffer length {} is not a multiple of {}",
            bytes.len(),
            WORD_BYTES
        )));
    }
    let mut words = vec![0u32; bytes.len() / WORD_BYTES];
    LittleEndian::read_u32_into(bytes, &mut words);
    Ok(words)
}

/// Serialize words as little-endian bytes
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = vec![0u8; words.len() * WORD_BYTES];
    LittleEndian::write_u32_into(words, &mut bytes);
    bytes
}

/// Reinterpret a buffer as a sequence of hash lanes
pub fn bytes_to_lanes(bytes: &[u8]) -> Result<Vec<HashLane>> {
    if bytes.len() % HASH_BYTES != 0 {
        return Err(Error::format(format!(
            "Buffer length {} is not a multiple of the {}-byte lane size",
            bytes.len(),
            HASH_BYTES
        )));
    }
    Ok(bytes
        .chunks_exact(HASH_BYTES)
        .map(HashLane::from_le_slice)
        .collect())
}

/// Serialize lanes back-to-back in index order
pub fn lanes_to_bytes(lanes: &[HashLane]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(lanes.len() * HASH_BYTES);
    for lane in lanes {
        bytes.extend_from_slice(&lane.to_le_bytes());
    }
    bytes
}
