//! Lane sources for Hashimoto
//!
//! Hashimoto only needs random access to dataset lanes. The dataset can be
//! held in memory, read lane by lane from a file, or recomputed from the cache
//! on demand; all three return identical lanes for identical inputs.

use crate::core::constants::HASH_BYTES;
use crate::core::HashLane;
use crate::error::{Error, Result};
use crate::ethash::cache::Cache;
use crate::ethash::dataset::{dataset_item, lane_count, Dataset};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Random access to dataset lanes
///
/// Implementations must be side-effect free: the same index always yields the
/// same lane.
pub trait LaneSource: Send + Sync {
    /// Fetch lane `index`
    fn lane(&self, index: usize) -> Result<HashLane>;

    /// Number of lanes available
    fn lane_count(&self) -> usize;
}

impl LaneSource for Dataset {
    fn lane(&self, index: usize) -> Result<HashLane> {
        self.lanes().get(index).copied().ok_or_else(|| {
            Error::invalid_size(format!(
                "Lane {} out of range for a dataset of {} lanes",
                index,
                self.len()
            ))
        })
    }

    fn lane_count(&self) -> usize {
        self.len()
    }
}

/// Dataset read lane by lane from a file in the flat lane format
#[derive(Debug)]
pub struct FileDataset {
    path: PathBuf,
    file: Mutex<File>,
    lanes: usize,
}

impl FileDataset {
    /// Open a dataset file; its length must be a whole number of lanes
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();

        if len % HASH_BYTES as u64 != 0 {
            let index = (len / HASH_BYTES as u64) as usize;
            return Err(Error::truncated(index, index as u64 * HASH_BYTES as u64));
        }

        let lanes = (len / HASH_BYTES as u64) as usize;
        info!(path = %path.display(), lanes, "Opened dataset file");
        Ok(Self {
            path,
            file: Mutex::new(file),
            lanes,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LaneSource for FileDataset {
    fn lane(&self, index: usize) -> Result<HashLane> {
        let offset = index as u64 * HASH_BYTES as u64;
        let mut buf = [0u8; HASH_BYTES];

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::truncated(index, offset),
            _ => Error::Io(e),
        })?;

        Ok(HashLane::from_le_bytes(&buf))
    }

    fn lane_count(&self) -> usize {
        self.lanes
    }
}

/// Light evaluation: each lane is derived from the cache when requested
#[derive(Debug, Clone)]
pub struct LightDataset {
    cache: Arc<Cache>,
    lanes: usize,
}

impl LightDataset {
    /// View `cache` as a dataset of `full_size` bytes
    pub fn new(cache: Arc<Cache>, full_size: usize) -> Result<Self> {
        let lanes = lane_count(full_size)?;
        Ok(Self { cache, lanes })
    }

    /// Borrow the backing cache
    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl LaneSource for LightDataset {
    fn lane(&self, index: usize) -> Result<HashLane> {
        if index >= self.lanes {
            return Err(Error::invalid_size(format!(
                "Lane {} out of range for a dataset of {} lanes",
                index, self.lanes
            )));
        }
        // lane_count() keeps every index within u32
        Ok(dataset_item(&self.cache, index as u32))
    }

    fn lane_count(&self) -> usize {
        self.lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethash::cache::build_cache;
    use crate::ethash::dataset::build_dataset;
    use std::io::Write;

    #[test]
    fn test_sources_agree() {
        let cache = Arc::new(build_cache(1024, &[0u8; 32]).unwrap());
        let dataset = build_dataset(&cache, 10240).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.bin");
        dataset.save(&path).unwrap();

        let file = FileDataset::open(&path).unwrap();
        let light = LightDataset::new(Arc::clone(&cache), 10240).unwrap();
        assert_eq!(file.lane_count(), 160);
        assert_eq!(light.lane_count(), 160);
        assert_eq!(file.path(), path.as_path());
        assert_eq!(light.cache(), cache.as_ref());

        for index in [0usize, 1, 77, 159] {
            let expected = dataset.lane(index).unwrap();
            assert_eq!(file.lane(index).unwrap(), expected);
            assert_eq!(light.lane(index).unwrap(), expected);
        }
    }

    #[test]
    fn test_out_of_range_lanes() {
        let cache = Arc::new(build_cache(1024, &[0u8; 32]).unwrap());
        let dataset = build_dataset(&cache, 128).unwrap();
        assert!(dataset.lane(2).is_err());

        let light = LightDataset::new(cache, 128).unwrap();
        assert!(light.lane(2).is_err());
    }

    #[test]
    fn test_read_past_end_is_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.bin");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        drop(file);

        let source = FileDataset::open(&path).unwrap();
        assert_eq!(source.lane(1).unwrap(), HashLane::default());
        match source.lane(5) {
            Err(Error::TruncatedDataset { index, offset }) => {
                assert_eq!(index, 5);
                assert_eq!(offset, 320);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_misaligned_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.bin");
        std::fs::write(&path, [0u8; 100]).unwrap();
        assert!(matches!(
            FileDataset::open(&path),
            Err(Error::TruncatedDataset { index: 1, offset: 64 })
        ));
    }
}
