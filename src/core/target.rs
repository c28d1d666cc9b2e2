//! 256-bit mining target

use crate::core::constants::DIGEST_SIZE;
use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Threshold a result hash must not exceed, stored as 32 big-endian bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target(pub [u8; DIGEST_SIZE]);

impl Target {
    /// Create a Target from big-endian bytes
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Largest representable target (2^256 - 1); every hash meets it
    pub fn max() -> Self {
        Self([0xFF; DIGEST_SIZE])
    }

    /// Zero target; only an all-zero hash meets it
    pub fn zero() -> Self {
        Self([0u8; DIGEST_SIZE])
    }

    /// Derive `2^256 / difficulty`, saturating at `2^256 - 1`
    pub fn from_difficulty(difficulty: u64) -> Result<Self> {
        if difficulty == 0 {
            return Err(Error::invalid_target("Difficulty must be greater than 0"));
        }

        let numerator = BigUint::one() << (DIGEST_SIZE * 8);
        let quotient = numerator / BigUint::from(difficulty);
        let max = Self::max().to_biguint();
        if quotient > max {
            return Ok(Self::max());
        }
        Self::from_biguint(&quotient)
    }

    /// Create from an integer that fits in 256 bits
    pub fn from_biguint(value: &BigUint) -> Result<Self> {
        if value.bits() > (DIGEST_SIZE * 8) as u64 {
            return Err(Error::invalid_target("Value exceeds 256 bits"));
        }

        let bytes = value.to_bytes_be();
        let mut target = [0u8; DIGEST_SIZE];
        target[DIGEST_SIZE - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(target))
    }

    /// Target as an arbitrary-precision integer
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Difficulty implied by this target (`2^256 / target`), None for a zero target
    pub fn difficulty(&self) -> Option<BigUint> {
        let target = self.to_biguint();
        if target.is_zero() {
            return None;
        }
        Some((BigUint::one() << (DIGEST_SIZE * 8)) / target)
    }

    /// Whether a result hash, read as a big-endian 256-bit integer, is `<=` this target
    pub fn is_met_by(&self, hash: &[u8; DIGEST_SIZE]) -> bool {
        // Equal-length big-endian byte strings order the same way as their integers
        hash.as_slice().cmp(self.0.as_slice()) != Ordering::Greater
    }

    /// Parse 64 hex characters
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex.trim_start_matches("0x"))
            .map_err(|e| Error::invalid_target(format!("Invalid hex: {}", e)))?;
        let array: [u8; DIGEST_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            Error::invalid_target(format!("Expected {} bytes, got {}", DIGEST_SIZE, bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Hex string of the big-endian bytes
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Big-endian bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_difficulty() {
        // 2^256 / 1 does not fit and saturates
        assert_eq!(Target::from_difficulty(1).unwrap(), Target::max());

        // 2^256 / 2 = 2^255
        let mut half = [0u8; 32];
        half[0] = 0x80;
        assert_eq!(Target::from_difficulty(2).unwrap(), Target(half));

        // 2^256 / 256 = 2^248
        let mut expected = [0u8; 32];
        expected[0] = 0x01;
        assert_eq!(Target::from_difficulty(256).unwrap(), Target(expected));

        assert!(matches!(Target::from_difficulty(0), Err(Error::InvalidTarget(_))));
    }

    #[test]
    fn test_difficulty_inverse() {
        let target = Target::from_difficulty(0x4000).unwrap();
        assert_eq!(target.difficulty().unwrap(), BigUint::from(0x4000u64));
        assert!(Target::zero().difficulty().is_none());
    }

    #[test]
    fn test_full_width_comparison() {
        let target = Target::from_difficulty(256).unwrap();

        let mut below = [0xFFu8; 32];
        below[0] = 0x00;
        below[1] = 0x00;
        assert!(target.is_met_by(&below));

        // Equal passes, one more fails
        assert!(target.is_met_by(target.as_bytes()));
        let mut above = *target.as_bytes();
        above[31] = 0x01;
        assert!(!target.is_met_by(&above));

        // Only the low bytes differ; a 32-bit prefix comparison would miss this
        let mut low_diff = [0u8; 32];
        low_diff[31] = 0x01;
        assert!(!Target::zero().is_met_by(&low_diff));
        assert!(Target::zero().is_met_by(&[0u8; 32]));
        assert!(Target::max().is_met_by(&[0xFF; 32]));
    }

    #[test]
    fn test_target_hex_and_serde() {
        let hex = "00000000ffff0000000000000000000000000000000000000000000000000000";
        let target = Target::from_hex(hex).unwrap();
        assert_eq!(target.to_hex(), hex);

        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, format!("\"{}\"", hex));
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);

        assert!(Target::from_hex("invalid").is_err());
        assert!(Target::from_hex("00").is_err());
    }

    #[test]
    fn test_biguint_roundtrip() {
        let value = BigUint::from(0xdead_beefu64) << 100;
        let target = Target::from_biguint(&value).unwrap();
        assert_eq!(target.to_biguint(), value);
        assert!(Target::from_biguint(&(BigUint::one() << 256)).is_err());
    }
}
