//! CPU mining worker implementation
//!
//! Multi-threaded nonce search. Threads claim batches of nonce offsets from a
//! shared counter, so the total number of tries across all threads never
//! exceeds the job's `time_limit` and no nonce is tried twice.

use super::{compute_hash_rate, mining_span, MineOutcome, MiningJob, MiningStats, Solution, Worker};
use crate::error::{Error, Result};
use crate::ethash::hashimoto::hashimoto;
use crate::ethash::source::LaneSource;
use crate::utils::{format_duration, format_hash_rate};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// CPU worker configuration
#[derive(Debug, Clone)]
pub struct CpuWorkerConfig {
    /// Number of mining threads (0 = number of CPUs)
    pub threads: usize,
    /// Nonce offsets claimed per counter update
    pub batch_size: u64,
}

impl Default for CpuWorkerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            batch_size: 64,
        }
    }
}

/// CPU mining worker using multiple threads
pub struct CpuWorker {
    config: CpuWorkerConfig,
    stats: MiningStats,
}

/// Counters shared by the mining threads of one run
#[derive(Debug, Default)]
struct SharedProgress {
    next_offset: AtomicU64,
    total_hashes: AtomicU64,
}

impl CpuWorker {
    /// Create a new CPU worker
    pub fn new(config: CpuWorkerConfig) -> Self {
        let threads = if config.threads == 0 {
            num_cpus::get()
        } else {
            config.threads
        };
        let batch_size = config.batch_size.max(1);

        info!(threads, batch_size, "Creating CPU worker");

        Self {
            config: CpuWorkerConfig {
                threads,
                batch_size,
            },
            stats: MiningStats::default(),
        }
    }

    /// Effective thread count
    pub fn threads(&self) -> usize {
        self.config.threads
    }

    /// Mine on one blocking thread until the range is spent or `stop` fires
    ///
    /// Returns the solution with its search offset, if this thread found one.
    fn mine_thread(
        thread_id: usize,
        job: &MiningJob,
        source: &dyn LaneSource,
        progress: &SharedProgress,
        batch_size: u64,
        stop: &CancellationToken,
    ) -> Result<Option<(u64, Solution)>> {
        debug!(thread_id, "Starting mining thread");
        let mut hashes = 0u64;

        'batches: while !stop.is_cancelled() {
            let start = progress.next_offset.fetch_add(batch_size, Ordering::Relaxed);
            if start >= job.time_limit {
                break;
            }
            let end = start.saturating_add(batch_size).min(job.time_limit);

            for offset in start..end {
                if stop.is_cancelled() {
                    break 'batches;
                }

                let nonce = job.nonce_at(offset);
                let output = match hashimoto(source, job.full_size, job.header.as_bytes(), nonce) {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(thread_id, nonce = %nonce, error = %e, "Lane source failed");
                        stop.cancel();
                        return Err(e);
                    }
                };
                hashes += 1;
                progress.total_hashes.fetch_add(1, Ordering::Relaxed);

                if job.target.is_met_by(&output.result) {
                    info!(thread_id, nonce = %nonce, "Solution found");
                    stop.cancel();
                    return Ok(Some((offset, Solution::new(nonce, output))));
                }
            }
        }

        debug!(thread_id, hashes, "Mining thread completed");
        Ok(None)
    }
}

#[async_trait]
impl Worker for CpuWorker {
    fn worker_type(&self) -> &'static str {
        "cpu"
    }

    async fn mine(
        &mut self,
        job: MiningJob,
        source: Arc<dyn LaneSource>,
        cancellation: CancellationToken,
    ) -> Result<MineOutcome> {
        let span = mining_span(self.worker_type(), &job);

        async move {
            info!(
                threads = self.config.threads,
                target = %job.target,
                "Starting CPU mining"
            );

            if job.time_limit == 0 {
                self.stats = MiningStats::default();
                return Ok(MineOutcome::Exhausted { tries: 0 });
            }

            let started = Instant::now();
            let job = Arc::new(job);
            let progress = Arc::new(SharedProgress::default());
            let stop = cancellation.child_token();

            let mut handles = Vec::with_capacity(self.config.threads);
            for thread_id in 0..self.config.threads {
                let job = Arc::clone(&job);
                let source = Arc::clone(&source);
                let progress = Arc::clone(&progress);
                let stop = stop.clone();
                let batch_size = self.config.batch_size;

                handles.push(task::spawn_blocking(move || {
                    Self::mine_thread(thread_id, &job, source.as_ref(), &progress, batch_size, &stop)
                }));
            }

            let mut first_error = None;
            let mut best: Option<(u64, Solution)> = None;
            for handle in handles {
                match handle.await {
                    Ok(Ok(Some(found))) => {
                        if best.map_or(true, |(offset, _)| found.0 < offset) {
                            best = Some(found);
                        }
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => {
                        first_error.get_or_insert(e);
                    }
                    Err(e) => {
                        stop.cancel();
                        first_error.get_or_insert(Error::worker(format!("Mining thread failed: {}", e)));
                    }
                }
            }

            let elapsed = started.elapsed();
            let total_hashes = progress.total_hashes.load(Ordering::Relaxed);
            self.stats = MiningStats::from_run(total_hashes, best.is_some() as u64, elapsed);
            info!(
                total_hashes,
                hash_rate = %format_hash_rate(compute_hash_rate(total_hashes, elapsed)),
                elapsed = %format_duration(elapsed),
                "CPU mining completed"
            );

            if let Some(e) = first_error {
                return Err(e);
            }
            if let Some((_, solution)) = best {
                return Ok(MineOutcome::Found(solution));
            }
            if cancellation.is_cancelled() {
                info!("CPU mining cancelled");
                return Err(Error::cancelled("CPU mining"));
            }

            warn!(tries = total_hashes, "Nonce budget exhausted without a solution");
            Ok(MineOutcome::Exhausted {
                tries: total_hashes,
            })
        }
        .instrument(span)
        .await
    }

    fn stats(&self) -> MiningStats {
        self.stats.clone()
    }
}
