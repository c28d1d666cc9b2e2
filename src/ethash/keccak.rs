//! Keccak-256 and Keccak-512 with the original (pre-SHA3) padding

use crate::core::constants::DIGEST_SIZE;
use crate::core::{codec, HashLane};
use sha3::{Digest, Keccak256, Keccak512};

/// Keccak-512 of a byte buffer, as a lane
pub fn keccak_512(data: &[u8]) -> HashLane {
    let digest = Keccak512::digest(data);
    HashLane::from_le_slice(&digest)
}

/// Keccak-512 of a lane's little-endian bytes
pub fn keccak_512_lane(lane: &HashLane) -> HashLane {
    keccak_512(&lane.to_le_bytes())
}

/// Keccak-256 of a byte buffer
pub fn keccak_256(data: &[u8]) -> [u8; DIGEST_SIZE] {
    Keccak256::digest(data).into()
}

/// Keccak-256 of words serialized little-endian
pub fn keccak_256_words(words: &[u32]) -> [u8; DIGEST_SIZE] {
    keccak_256(&codec::words_to_bytes(words))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_256_empty() {
        assert_eq!(
            hex::encode(keccak_256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak_512_empty() {
        assert_eq!(
            keccak_512(b"").to_hex(),
            "0eab42de4c3ceb9235fc91acffe746b29c29a8c366b7c60e4e67c466f36a4304\
             c00fa9caf9d87976ba469bcbe06713b435f091ef2769fb160cdab33d3670680e"
        );
    }

    #[test]
    fn test_keccak_512_lane_matches_bytes() {
        let lane = HashLane::new([0xdead_beef; 16]);
        assert_eq!(keccak_512_lane(&lane), keccak_512(&lane.to_le_bytes()));
    }

    #[test]
    fn test_keccak_256_words_matches_bytes() {
        let words = [1u32, 2, 3];
        assert_eq!(
            keccak_256_words(&words),
            keccak_256(&[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0])
        );
    }
}
