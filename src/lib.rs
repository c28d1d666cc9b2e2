//! Ethash Miner
//!
//! An implementation of the Ethash proof-of-work pipeline:
//! - Cache construction from a 32-byte seed
//! - Parallel full-dataset generation, in memory or streamed to disk
//! - Hashimoto over in-memory, file-backed or cache-derived (light) lanes
//! - Sequential and multi-threaded nonce search against a 256-bit target

#![warn(missing_docs, rust_2018_idioms, unused_lifetimes, clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod ethash;
pub mod utils;
pub mod worker;

pub use config::Config;
pub use crate::core::{Header, HashLane, Nonce, Target};
pub use error::{Error, Result};
pub use ethash::{
    build_cache, build_dataset, hashimoto, hashimoto_full, hashimoto_light, verify, Cache,
    Dataset, EpochSeed, FileDataset, HashimotoOutput, LaneSource, LightDataset,
};
pub use worker::{CpuWorker, CpuWorkerConfig, MineOutcome, Miner, MiningJob, Solution, Worker};

/// Application name
pub const APP_NAME: &str = "ethash-miner";
/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
