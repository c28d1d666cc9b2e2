//! FNV-style mixing used throughout Ethash
//!
//! Unlike FNV-1a this multiplies before the xor, and it takes a full word as
//! the second operand rather than a byte.

/// FNV prime
pub const FNV_PRIME: u32 = 0x0100_0193;

/// `(v1 * FNV_PRIME) ^ v2` in wrapping 32-bit arithmetic
#[inline(always)]
pub fn fnv(v1: u32, v2: u32) -> u32 {
    v1.wrapping_mul(FNV_PRIME) ^ v2
}

/// Word-wise `mix[k] = fnv(mix[k], data[k])`
#[inline]
pub fn fnv_lane(mix: &mut [u32], data: &[u32]) {
    debug_assert_eq!(mix.len(), data.len());
    for (m, &d) in mix.iter_mut().zip(data) {
        *m = fnv(*m, d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv_wraparound() {
        assert_eq!(fnv(0xFFFF_FFFF, 0xFFFF_FFFF), 0x0100_0192);
    }

    #[test]
    fn test_fnv_basic() {
        assert_eq!(fnv(0, 0), 0);
        assert_eq!(fnv(1, 0), FNV_PRIME);
        assert_eq!(fnv(0, 0x1234_5678), 0x1234_5678);
        assert_eq!(fnv(2, 1), (2 * FNV_PRIME) ^ 1);
    }

    #[test]
    fn test_fnv_lane() {
        let mut mix = [1u32, 2, 3];
        fnv_lane(&mut mix, &[4, 5, 6]);
        assert_eq!(mix, [fnv(1, 4), fnv(2, 5), fnv(3, 6)]);
    }
}
