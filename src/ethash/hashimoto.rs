//! Hashimoto: the per-nonce dataset probing loop

use crate::core::constants::{ACCESSES, DIGEST_SIZE, LANE_WORDS, MIX_LANES, MIX_WORDS};
use crate::core::{codec, Nonce, Target};
use crate::error::{Error, Result};
use crate::ethash::cache::Cache;
use crate::ethash::dataset::{lane_count, Dataset};
use crate::ethash::fnv::{fnv, fnv_lane};
use crate::ethash::keccak::{keccak_256_words, keccak_512};
use crate::ethash::source::{LaneSource, LightDataset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Digest pair produced for one (header, nonce)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashimotoOutput {
    /// Compressed mix, 8 little-endian words
    #[serde(with = "hex_digest")]
    pub mix_digest: [u8; DIGEST_SIZE],
    /// Keccak-256 of the seed hash and compressed mix
    #[serde(with = "hex_digest")]
    pub result: [u8; DIGEST_SIZE],
}

/// Run Hashimoto over any lane source
pub fn hashimoto<S: LaneSource + ?Sized>(
    source: &S,
    full_size: usize,
    header: &[u8],
    nonce: Nonce,
) -> Result<HashimotoOutput> {
    let n = lane_count(full_size)?;
    if source.lane_count() < n {
        return Err(Error::invalid_size(format!(
            "Lane source holds {} lanes, dataset size {} needs {}",
            source.lane_count(),
            full_size,
            n
        )));
    }

    let mut seed_bytes = Vec::with_capacity(header.len() + 8);
    seed_bytes.extend_from_slice(header);
    seed_bytes.extend_from_slice(&nonce.to_le_bytes());
    let s = keccak_512(&seed_bytes);

    let mut mix = [0u32; MIX_WORDS];
    for chunk in mix.chunks_exact_mut(LANE_WORDS) {
        chunk.copy_from_slice(s.words());
    }

    let pages = (n / MIX_LANES) as u32;
    let mut page = [0u32; MIX_WORDS];
    for i in 0..ACCESSES {
        let p = (fnv(i ^ s[0], mix[i as usize % MIX_WORDS]) % pages) as usize * MIX_LANES;
        for (k, chunk) in page.chunks_exact_mut(LANE_WORDS).enumerate() {
            chunk.copy_from_slice(source.lane(p + k)?.words());
        }
        fnv_lane(&mut mix, &page);
    }

    let cmix: Vec<u32> = mix
        .chunks_exact(4)
        .map(|w| fnv(fnv(fnv(w[0], w[1]), w[2]), w[3]))
        .collect();

    let mut mix_digest = [0u8; DIGEST_SIZE];
    mix_digest.copy_from_slice(&codec::words_to_bytes(&cmix));

    let mut final_words = Vec::with_capacity(LANE_WORDS + cmix.len());
    final_words.extend_from_slice(s.words());
    final_words.extend_from_slice(&cmix);

    Ok(HashimotoOutput {
        mix_digest,
        result: keccak_256_words(&final_words),
    })
}

/// Hashimoto over an in-memory dataset
pub fn hashimoto_full(dataset: &Dataset, header: &[u8], nonce: Nonce) -> Result<HashimotoOutput> {
    hashimoto(dataset, dataset.full_size(), header, nonce)
}

/// Hashimoto evaluated from the cache alone
pub fn hashimoto_light(
    cache: &Arc<Cache>,
    full_size: usize,
    header: &[u8],
    nonce: Nonce,
) -> Result<HashimotoOutput> {
    let light = LightDataset::new(Arc::clone(cache), full_size)?;
    hashimoto(&light, full_size, header, nonce)
}

/// Check a claimed solution
///
/// Returns `Ok(true)` only when the recomputed mix digest equals
/// `mix_digest` and the recomputed result meets `target`.
pub fn verify<S: LaneSource + ?Sized>(
    source: &S,
    full_size: usize,
    header: &[u8],
    nonce: Nonce,
    mix_digest: &[u8; DIGEST_SIZE],
    target: &Target,
) -> Result<bool> {
    let output = hashimoto(source, full_size, header, nonce)?;
    Ok(&output.mix_digest == mix_digest && target.is_met_by(&output.result))
}

pub(crate) mod hex_digest {
    use super::DIGEST_SIZE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; DIGEST_SIZE], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; DIGEST_SIZE], D::Error> {
        let text = String::deserialize(d)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}
