//! Full dataset generation and persistence
//!
//! Every item depends only on the immutable cache, so generation is a rayon
//! map over item indices. The on-disk format is the flat lane sequence with
//! lane `i` at byte offset `i * 64` and no header.

use crate::core::constants::{DATASET_PARENTS, HASH_BYTES, LANE_WORDS, MIX_LANES};
use crate::core::{codec, HashLane};
use crate::error::{Error, Result};
use crate::ethash::cache::Cache;
use crate::ethash::fnv::{fnv, fnv_lane};
use crate::ethash::keccak::keccak_512_lane;
use crate::utils::format_duration;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Lanes generated per parallel chunk when streaming to disk (16 MiB)
const WRITE_CHUNK_LANES: usize = 1 << 18;

/// Compute dataset item `index` from the cache
pub fn dataset_item(cache: &Cache, index: u32) -> HashLane {
    let n = cache.len();
    let mut mix = cache[index as usize % n];
    mix[0] ^= index;
    mix = keccak_512_lane(&mix);

    for j in 0..DATASET_PARENTS {
        let parent = fnv(index ^ j, mix[j as usize % LANE_WORDS]) as usize % n;
        fnv_lane(mix.words_mut(), cache[parent].words());
    }

    keccak_512_lane(&mix)
}

/// Number of lanes for a dataset of `full_size` bytes
pub fn lane_count(full_size: usize) -> Result<usize> {
    if full_size % HASH_BYTES != 0 {
        return Err(Error::invalid_size(format!(
            "Dataset size {} is not a multiple of {}",
            full_size, HASH_BYTES
        )));
    }
    let lanes = full_size / HASH_BYTES;
    if lanes < MIX_LANES {
        return Err(Error::invalid_size(format!(
            "Dataset size {} is smaller than one mix page ({} bytes)",
            full_size,
            MIX_LANES * HASH_BYTES
        )));
    }
    // Item indices are mixed as 32-bit words
    if u32::try_from(lanes).is_err() {
        return Err(Error::invalid_size(format!(
            "Dataset size {} exceeds the 32-bit item index range",
            full_size
        )));
    }
    Ok(lanes)
}

/// In-memory dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    lanes: Vec<HashLane>,
}

impl Dataset {
    /// Wrap pre-computed lanes
    pub fn from_lanes(lanes: Vec<HashLane>) -> Result<Self> {
        lane_count(lanes.len() * HASH_BYTES)?;
        Ok(Self { lanes })
    }

    /// Number of lanes
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether the dataset is empty (never true for a validated dataset)
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Size in bytes
    pub fn full_size(&self) -> usize {
        self.lanes.len() * HASH_BYTES
    }

    /// Borrow the lanes
    pub fn lanes(&self) -> &[HashLane] {
        &self.lanes
    }

    /// Write the dataset to `path` in the flat lane format
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        for lane in &self.lanes {
            writer.write_all(&lane.to_le_bytes())?;
        }
        writer.flush()?;
        info!(path = %path.display(), bytes = self.full_size(), "Dataset saved");
        Ok(())
    }

    /// Read a whole dataset file into memory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;

        if bytes.len() % HASH_BYTES != 0 {
            let index = bytes.len() / HASH_BYTES;
            return Err(Error::truncated(index, (index * HASH_BYTES) as u64));
        }

        let lanes = codec::bytes_to_lanes(&bytes)?;
        info!(path = %path.display(), lanes = lanes.len(), "Dataset loaded");
        Self::from_lanes(lanes)
    }
}

/// Expand the cache into a dataset of `full_size` bytes
pub fn build_dataset(cache: &Cache, full_size: usize) -> Result<Dataset> {
    let lanes = lane_count(full_size)?;
    let started = Instant::now();
    info!(full_size, lanes, threads = rayon::current_num_threads(), "Building dataset");

    let items: Vec<HashLane> = (0..lanes as u32)
        .into_par_iter()
        .map(|i| dataset_item(cache, i))
        .collect();

    info!(
        elapsed = %format_duration(started.elapsed()),
        "Dataset ready"
    );
    Ok(Dataset { lanes: items })
}

/// Generate the dataset chunk by chunk and stream it to `path`
///
/// Only one chunk is held in memory at a time; the file is byte-identical to
/// `build_dataset(cache, full_size)?.save(path)`.
pub fn write_dataset(cache: &Cache, full_size: usize, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let lanes = lane_count(full_size)?;
    let started = Instant::now();
    info!(full_size, path = %path.display(), "Streaming dataset to file");

    let mut writer = BufWriter::new(File::create(path)?);
    let mut start = 0usize;
    while start < lanes {
        let end = (start + WRITE_CHUNK_LANES).min(lanes);
        let chunk: Vec<HashLane> = (start as u32..end as u32)
            .into_par_iter()
            .map(|i| dataset_item(cache, i))
            .collect();
        writer.write_all(&codec::lanes_to_bytes(&chunk))?;
        debug!(written = end, total = lanes, "Dataset chunk written");
        start = end;
    }
    writer.flush()?;

    info!(
        elapsed = %format_duration(started.elapsed()),
        "Dataset written"
    );
    Ok(())
}
