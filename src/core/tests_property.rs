//! Property-based tests for the codec and value types

use super::codec::*;
use super::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn word_roundtrip(word in any::<u32>()) {
        prop_assert_eq!(bytes_to_word(&word_to_bytes(word)).unwrap(), word);
    }

    #[test]
    fn nonce_roundtrip(value in any::<u64>()) {
        prop_assert_eq!(bytes_to_nonce(&nonce_to_bytes(value)).unwrap(), value);
        let nonce = Nonce::new(value);
        prop_assert_eq!(Nonce::from_le_slice(&nonce.to_le_bytes()).unwrap(), nonce);
    }

    #[test]
    fn words_roundtrip(words in prop::collection::vec(any::<u32>(), 0..64)) {
        let bytes = words_to_bytes(&words);
        prop_assert_eq!(bytes.len(), words.len() * 4);
        prop_assert_eq!(bytes_to_words(&bytes).unwrap(), words);
    }

    #[test]
    fn misaligned_buffers_fail(len in 0usize..256) {
        let bytes = vec![0u8; len];
        prop_assert_eq!(bytes_to_words(&bytes).is_ok(), len % 4 == 0);
        prop_assert_eq!(bytes_to_lanes(&bytes).is_ok(), len % 64 == 0);
    }

    #[test]
    fn lane_roundtrip(words in prop::array::uniform16(any::<u32>())) {
        let lane = HashLane::new(words);
        prop_assert_eq!(HashLane::from_le_bytes(&lane.to_le_bytes()), lane);
    }

    #[test]
    fn target_matches_integer_order(
        hash in prop::array::uniform32(any::<u8>()),
        target in prop::array::uniform32(any::<u8>())
    ) {
        let t = Target::from_bytes(target);
        let as_int = num_bigint::BigUint::from_bytes_be(&hash);
        prop_assert_eq!(t.is_met_by(&hash), as_int <= t.to_biguint());
    }

    #[test]
    fn difficulty_target_is_monotonic(a in 1u64..u64::MAX, b in 1u64..u64::MAX) {
        prop_assume!(a <= b);
        let ta = Target::from_difficulty(a).unwrap().to_biguint();
        let tb = Target::from_difficulty(b).unwrap().to_biguint();
        prop_assert!(tb <= ta);
    }
}
