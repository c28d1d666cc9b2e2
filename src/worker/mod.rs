//! Mining workers
//!
//! A job describes what to search (header, target, nonce range); a worker
//! decides how. The sequential `Miner` walks the range on the calling thread,
//! the `CpuWorker` spreads it over blocking tasks.

use crate::core::constants::DIGEST_SIZE;
use crate::core::{Header, Nonce, Target};
use crate::error::Result;
use crate::ethash::hashimoto::{hex_digest, HashimotoOutput};
use crate::ethash::source::LaneSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub mod cpu;
pub mod miner;

pub use cpu::{CpuWorker, CpuWorkerConfig};
pub use miner::Miner;

/// Parameters of one nonce search
#[derive(Debug, Clone)]
pub struct MiningJob {
    /// Header the nonce is appended to
    pub header: Header,
    /// Threshold the result hash must not exceed
    pub target: Target,
    /// First nonce tried
    pub initial_nonce: Nonce,
    /// Maximum number of nonces tried
    pub time_limit: u64,
    /// Dataset size in bytes
    pub full_size: usize,
}

impl MiningJob {
    /// Nonce tried at position `offset` of the search
    pub fn nonce_at(&self, offset: u64) -> Nonce {
        self.initial_nonce.wrapping_add(offset)
    }
}

/// A nonce whose result meets the target, with its digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Winning nonce
    pub nonce: Nonce,
    /// Compressed mix for the nonce
    #[serde(with = "hex_digest")]
    pub mix_digest: [u8; DIGEST_SIZE],
    /// Result hash that met the target
    #[serde(with = "hex_digest")]
    pub result: [u8; DIGEST_SIZE],
}

impl Solution {
    /// Pair a nonce with its Hashimoto output
    pub fn new(nonce: Nonce, output: HashimotoOutput) -> Self {
        Self {
            nonce,
            mix_digest: output.mix_digest,
            result: output.result,
        }
    }
}

/// Terminal state of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MineOutcome {
    /// A nonce met the target
    Found(Solution),
    /// The try budget ran out first
    Exhausted {
        /// Nonces tried
        tries: u64,
    },
}

impl MineOutcome {
    /// The solution, if one was found
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            MineOutcome::Found(solution) => Some(solution),
            MineOutcome::Exhausted { .. } => None,
        }
    }
}

/// Mining statistics for a worker
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total hashes computed
    pub total_hashes: u64,
    /// Number of solutions found
    pub solutions_found: u64,
    /// Time spent mining
    pub elapsed: Duration,
    /// Hashes per second over `elapsed`
    pub hash_rate: f64,
}

impl MiningStats {
    /// Build stats from a hash count and the time it took
    pub fn from_run(total_hashes: u64, solutions_found: u64, elapsed: Duration) -> Self {
        Self {
            total_hashes,
            solutions_found,
            elapsed,
            hash_rate: compute_hash_rate(total_hashes, elapsed),
        }
    }
}

/// Mining worker trait
///
/// Workers search `job`'s nonce range against `source` until a solution is
/// found, the try budget is spent, or `cancellation` fires.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Get the worker type name for logging
    fn worker_type(&self) -> &'static str;

    /// Run the search
    async fn mine(
        &mut self,
        job: MiningJob,
        source: Arc<dyn LaneSource>,
        cancellation: CancellationToken,
    ) -> Result<MineOutcome>;

    /// Statistics of the last run
    fn stats(&self) -> MiningStats {
        MiningStats::default()
    }
}

/// Utility function to compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Create a tracing span for mining operations
pub fn mining_span(worker_type: &str, job: &MiningJob) -> Span {
    tracing::info_span!(
        "mining",
        worker_type = worker_type,
        initial_nonce = job.initial_nonce.value(),
        time_limit = job.time_limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_rate() {
        assert_eq!(compute_hash_rate(1000, Duration::from_secs(10)), 100.0);
        assert_eq!(compute_hash_rate(0, Duration::from_secs(10)), 0.0);
        assert_eq!(compute_hash_rate(1000, Duration::from_secs(0)), 0.0);
    }

    #[test]
    fn test_mining_stats_from_run() {
        let stats = MiningStats::from_run(500, 1, Duration::from_secs(5));
        assert_eq!(stats.total_hashes, 500);
        assert_eq!(stats.solutions_found, 1);
        assert_eq!(stats.hash_rate, 100.0);
    }

    #[test]
    fn test_nonce_at_wraps() {
        let job = MiningJob {
            header: Header::zeroed(4),
            target: Target::max(),
            initial_nonce: Nonce::new(u64::MAX),
            time_limit: 10,
            full_size: 128,
        };
        assert_eq!(job.nonce_at(0), Nonce::new(u64::MAX));
        assert_eq!(job.nonce_at(1), Nonce::new(0));
    }

    #[test]
    fn test_solution_serializes_as_hex() {
        let solution = Solution {
            nonce: Nonce::new(16),
            mix_digest: [0x11; 32],
            result: [0x22; 32],
        };
        let json = serde_json::to_value(solution).unwrap();
        assert_eq!(json["nonce"], 16);
        assert_eq!(json["result"], "22".repeat(32));
        assert_eq!(
            MineOutcome::Found(solution).solution(),
            Some(&solution)
        );
        assert_eq!(MineOutcome::Exhausted { tries: 3 }.solution(), None);
    }
}
