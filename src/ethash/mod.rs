//! Ethash pipeline: seed to cache to dataset to Hashimoto

pub mod cache;
pub mod dataset;
pub mod epoch;
pub mod fnv;
pub mod hashimoto;
pub mod keccak;
pub mod source;

pub use cache::{build_cache, Cache};
pub use dataset::{build_dataset, dataset_item, write_dataset, Dataset};
pub use epoch::EpochSeed;
pub use hashimoto::{hashimoto, hashimoto_full, hashimoto_light, verify, HashimotoOutput};
pub use source::{FileDataset, LaneSource, LightDataset};
