//! Sequential miner
//!
//! Tries `initial_nonce`, `initial_nonce + 1`, ... (wrapping) until a result
//! meets the target or `time_limit` nonces have been tried.

use super::{MineOutcome, MiningJob, Solution};
use crate::error::Result;
use crate::ethash::hashimoto::hashimoto;
use crate::ethash::source::LaneSource;
use crate::utils::format_duration;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Single-threaded nonce search over a lane source
pub struct Miner<'a, S: LaneSource + ?Sized> {
    source: &'a S,
    verbose: bool,
}

impl<'a, S: LaneSource + ?Sized> Miner<'a, S> {
    /// Create a miner reading lanes from `source`
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            verbose: false,
        }
    }

    /// Log every attempt at debug level
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Search the job's nonce range
    pub fn mine(&self, job: &MiningJob) -> Result<MineOutcome> {
        let started = Instant::now();
        let mut nonce = job.initial_nonce;
        let mut tries_remaining = job.time_limit;

        while tries_remaining > 0 {
            let output = hashimoto(self.source, job.full_size, job.header.as_bytes(), nonce)?;

            if self.verbose {
                debug!(
                    nonce = %nonce,
                    result = %hex::encode(output.result),
                    mix_digest = %hex::encode(output.mix_digest),
                    "Attempt"
                );
            }

            if job.target.is_met_by(&output.result) {
                info!(
                    nonce = %nonce,
                    tries = job.time_limit - tries_remaining + 1,
                    elapsed = %format_duration(started.elapsed()),
                    "Solution found"
                );
                return Ok(MineOutcome::Found(Solution::new(nonce, output)));
            }

            nonce.increment();
            tries_remaining -= 1;
        }

        warn!(tries = job.time_limit, "Nonce budget exhausted without a solution");
        Ok(MineOutcome::Exhausted {
            tries: job.time_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_HEADER_SIZE;
    use crate::core::{Header, Nonce, Target};
    use crate::ethash::{build_cache, build_dataset, hashimoto_full, Dataset};
    use assert_matches::assert_matches;

    fn dataset() -> Dataset {
        let cache = build_cache(1024, &[0u8; 32]).unwrap();
        build_dataset(&cache, 10240).unwrap()
    }

    fn job(target: Target, initial_nonce: u64, time_limit: u64) -> MiningJob {
        MiningJob {
            header: Header::zeroed(DEFAULT_HEADER_SIZE),
            target,
            initial_nonce: Nonce::new(initial_nonce),
            time_limit,
            full_size: 10240,
        }
    }

    #[test]
    fn test_difficulty_16_finds_nonce_16() {
        let dataset = dataset();
        let outcome = Miner::new(&dataset)
            .mine(&job(Target::from_difficulty(16).unwrap(), 0, 100))
            .unwrap();
        assert_matches!(outcome, MineOutcome::Found(s) if s.nonce == Nonce::new(16));
    }

    #[test]
    fn test_difficulty_256_finds_nonce_220() {
        let dataset = dataset();
        let outcome = Miner::new(&dataset)
            .with_verbose(true)
            .mine(&job(Target::from_difficulty(256).unwrap(), 0, 1000))
            .unwrap();

        let solution = *outcome.solution().unwrap();
        assert_eq!(solution.nonce, Nonce::new(220));
        assert_eq!(
            hex::encode(solution.result),
            "00016d3ffd98f3e514a216d5ac533730975c95e11db3435c3aed958a1205505e"
        );
        let header = [0u8; DEFAULT_HEADER_SIZE];
        let recomputed = hashimoto_full(&dataset, &header, solution.nonce).unwrap();
        assert_eq!(recomputed.mix_digest, solution.mix_digest);
    }

    #[test]
    fn test_zero_target_exhausts_exactly() {
        let dataset = dataset();
        let outcome = Miner::new(&dataset).mine(&job(Target::zero(), 0, 7)).unwrap();
        assert_eq!(outcome, MineOutcome::Exhausted { tries: 7 });
    }

    #[test]
    fn test_zero_time_limit() {
        let dataset = dataset();
        let outcome = Miner::new(&dataset).mine(&job(Target::max(), 0, 0)).unwrap();
        assert_eq!(outcome, MineOutcome::Exhausted { tries: 0 });
    }

    #[test]
    fn test_easy_target_takes_first_nonce() {
        let dataset = dataset();
        for difficulty in [1, 2] {
            let outcome = Miner::new(&dataset)
                .mine(&job(Target::from_difficulty(difficulty).unwrap(), 0, 1))
                .unwrap();
            assert_matches!(outcome, MineOutcome::Found(s) if s.nonce == Nonce::new(0));
        }
    }

    #[test]
    fn test_nonce_wraps_around() {
        let dataset = dataset();
        let outcome = Miner::new(&dataset)
            .mine(&job(Target::max(), u64::MAX, 2))
            .unwrap();
        assert_matches!(outcome, MineOutcome::Found(s) if s.nonce == Nonce::new(u64::MAX));
    }

    #[test]
    fn test_source_errors_propagate() {
        let cache = build_cache(1024, &[0u8; 32]).unwrap();
        let small = build_dataset(&cache, 128).unwrap();
        assert!(Miner::new(&small).mine(&job(Target::max(), 0, 1)).is_err());
    }
}
