//! Ethash Miner - Main Application

use ethash_miner::{
    config::{Config, Mode},
    core::constants::HASH_BYTES,
    ethash::{build_cache, build_dataset, verify, write_dataset, Cache, FileDataset, LaneSource, LightDataset},
    utils::{format_bytes, init_logging},
    worker::{CpuWorker, CpuWorkerConfig, MineOutcome, Miner, MiningJob, Worker},
    Error, Result, APP_NAME, APP_VERSION,
};
use std::sync::Arc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(category = e.category(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::load().await?;

    if config.print_config {
        print_configuration(&config)?;
        return Ok(());
    }

    init_logging(config.log_level.as_str(), config.log_format.as_str());

    let (cache_size, full_size) = config.sizes()?;
    info!(
        "Starting {} v{} (mode={}, cache={}, dataset={})",
        APP_NAME,
        APP_VERSION,
        config.mode,
        format_bytes(cache_size as u64),
        format_bytes(full_size as u64)
    );

    match config.mode {
        Mode::Full => {
            let cache = prepare_cache(&config, cache_size).await?;
            let dataset = task::spawn_blocking(move || build_dataset(&cache, full_size))
                .await
                .map_err(join_error)??;
            mine(&config, Arc::new(dataset), full_size).await
        }
        Mode::SaveDataset => {
            let cache = prepare_cache(&config, cache_size).await?;
            let path = config.dataset_path.clone();
            task::spawn_blocking(move || write_dataset(&cache, full_size, &path))
                .await
                .map_err(join_error)??;
            println!("Dataset written to {}", config.dataset_path.display());
            Ok(())
        }
        Mode::MineFile => {
            let source = FileDataset::open(&config.dataset_path)?;
            info!(
                path = %source.path().display(),
                size = %format_bytes((source.lane_count() * HASH_BYTES) as u64),
                "Mining from dataset file"
            );
            mine(&config, Arc::new(source), full_size).await
        }
        Mode::Light => {
            let cache = prepare_cache(&config, cache_size).await?;
            let source = LightDataset::new(cache, full_size)?;
            info!(
                cache = %format_bytes(source.cache().size() as u64),
                "Mining with light evaluation"
            );
            mine(&config, Arc::new(source), full_size).await
        }
        Mode::Verify => {
            let cache = prepare_cache(&config, cache_size).await?;
            let source = LightDataset::new(cache, full_size)?;
            let header = config.header()?;
            let target = config.target()?;
            let nonce = config.initial_nonce();
            let mix_digest = config
                .mix_digest()?
                .ok_or_else(|| Error::config("Verify mode requires --mix-digest"))?;

            let valid = task::spawn_blocking(move || {
                verify(&source, full_size, header.as_bytes(), nonce, &mix_digest, &target)
            })
            .await
            .map_err(join_error)??;

            println!("{}", if valid { "valid" } else { "invalid" });
            Ok(())
        }
    }
}

/// Build the cache for the configured seed off the async runtime
async fn prepare_cache(config: &Config, cache_size: usize) -> Result<Arc<Cache>> {
    let seed = config.seed()?;
    let cache = task::spawn_blocking(move || build_cache(cache_size, seed.as_bytes()))
        .await
        .map_err(join_error)??;
    Ok(Arc::new(cache))
}

/// Run the nonce search and print the outcome
async fn mine(config: &Config, source: Arc<dyn LaneSource>, full_size: usize) -> Result<()> {
    let job = MiningJob {
        header: config.header()?,
        target: config.target()?,
        initial_nonce: config.initial_nonce(),
        time_limit: config.time_limit,
        full_size,
    };
    info!(
        initial_nonce = %job.initial_nonce,
        difficulty = config.difficulty,
        time_limit = job.time_limit,
        "Mining"
    );

    let outcome = if config.threads == 1 {
        let verbose = config.verbose;
        task::spawn_blocking(move || Miner::new(source.as_ref()).with_verbose(verbose).mine(&job))
            .await
            .map_err(join_error)??
    } else {
        let cancellation = CancellationToken::new();
        let ctrl_c = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping workers");
                ctrl_c.cancel();
            }
        });

        let mut worker = CpuWorker::new(CpuWorkerConfig {
            threads: config.threads,
            ..CpuWorkerConfig::default()
        });
        worker.mine(job, source, cancellation).await?
    };

    match outcome {
        MineOutcome::Found(solution) => {
            println!("{}", serde_json::to_string_pretty(&solution)?);
        }
        MineOutcome::Exhausted { tries } => {
            println!("No solution found after {} tries", tries);
        }
    }
    Ok(())
}

fn join_error(e: task::JoinError) -> Error {
    Error::worker(format!("Blocking task failed: {}", e))
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}
