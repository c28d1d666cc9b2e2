//! Configuration management for the Ethash miner
//!
//! Supports configuration via command line arguments, environment variables,
//! and configuration files (YAML/JSON). Values from a file only fill in
//! options that were not given explicitly on the command line.

use crate::core::constants::{DEFAULT_HEADER_SIZE, DIGEST_SIZE, HASH_BYTES, MIX_LANES};
use crate::core::{Header, Nonce, Target};
use crate::error::{Error, Result};
use crate::ethash::epoch::{self, EpochSeed};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// What the binary does
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Build cache and dataset in memory, then mine
    Full,
    /// Build cache and stream the dataset to `dataset_path`
    SaveDataset,
    /// Mine against an existing dataset file
    MineFile,
    /// Mine from the cache alone, deriving lanes on demand
    Light,
    /// Check a nonce and mix digest against the target
    Verify,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::SaveDataset => write!(f, "save-dataset"),
            Mode::MineFile => write!(f, "mine-file"),
            Mode::Light => write!(f, "light"),
            Mode::Verify => write!(f, "verify"),
        }
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Pipeline milestones
    Info,
    /// Per-thread progress and verbose attempts
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Format name passed to `init_logging`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// Complete configuration for the miner
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "ethash-miner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ethash proof-of-work miner",
    long_about = "Builds the Ethash cache and dataset from a seed and searches for a nonce whose hashimoto result meets a difficulty target"
)]
pub struct Config {
    /// Print the parsed configuration and exit
    #[arg(long)]
    #[serde(skip)]
    pub print_config: bool,

    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// Operation to run
    #[arg(short = 'm', long, value_enum, default_value = "full")]
    #[serde(default = "default_mode")]
    pub mode: Mode,

    /// Cache size in bytes (multiple of 64)
    #[arg(long, default_value = "16776896")]
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Dataset size in bytes (multiple of 64, at least 128)
    #[arg(long, default_value = "16776896")]
    #[serde(default = "default_full_size")]
    pub full_size: usize,

    /// Derive cache and dataset sizes from the block number's epoch
    #[arg(long)]
    #[serde(default)]
    pub epoch_sizes: bool,

    /// Block number selecting the epoch
    #[arg(short = 'b', long, default_value = "1")]
    #[serde(default = "default_block_number")]
    pub block_number: u64,

    /// Header size in bytes
    #[arg(long, default_value = "548")]
    #[serde(default = "default_header_size")]
    pub header_size: usize,

    /// Header as hex (default: all-zero header of `header_size` bytes)
    #[arg(long, value_name = "HEX")]
    #[serde(default)]
    pub header_hex: Option<String>,

    /// Mining difficulty; target = 2^256 / difficulty
    #[arg(short = 'd', long, default_value = "16384")]
    #[serde(default = "default_difficulty")]
    pub difficulty: u64,

    /// Maximum number of nonces to try
    #[arg(short = 'n', long, default_value = "1000000")]
    #[serde(default = "default_time_limit")]
    pub time_limit: u64,

    /// Mining threads (1 = sequential miner, 0 = number of CPUs)
    #[arg(short = 't', long, default_value = "1")]
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Initial nonce (default: random); the nonce to check in verify mode
    #[arg(long)]
    #[serde(default)]
    pub nonce: Option<u64>,

    /// Claimed mix digest as hex (verify mode)
    #[arg(long, value_name = "HEX")]
    #[serde(default)]
    pub mix_digest: Option<String>,

    /// Dataset file for save-dataset and mine-file modes
    #[arg(long, default_value = "ethash-dataset.bin")]
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Log every mining attempt at debug level
    #[arg(short = 'v', long)]
    #[serde(default)]
    pub verbose: bool,

    /// Log level
    #[arg(short = 'l', long, env = "ETHASH_LOG_LEVEL", default_value = "info")]
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, default_value = "text")]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Config {
    /// Parse the process arguments and merge the config file if specified
    pub async fn load() -> Result<Self> {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches).await
    }

    /// Same as `load`, for an explicit argument list
    pub async fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .map_err(|e| Error::config(e.to_string()))?;
        Self::from_matches(&matches).await
    }

    async fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config =
            Self::from_arg_matches(matches).map_err(|e| Error::config(e.to_string()))?;

        if let Some(config_file) = config.config_file.clone() {
            let file_config = Self::load_from_file(&config_file).await?;
            config = config.merge_with_file(file_config, matches);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Merge CLI config with file config (explicit CLI values take precedence)
    fn merge_with_file(mut self, file: Self, matches: &ArgMatches) -> Self {
        let explicit = |id: &str| {
            matches!(
                matches.value_source(id),
                Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
            )
        };

        keep_or_replace(&mut self.mode, file.mode, explicit("mode"));
        keep_or_replace(&mut self.cache_size, file.cache_size, explicit("cache_size"));
        keep_or_replace(&mut self.full_size, file.full_size, explicit("full_size"));
        keep_or_replace(&mut self.epoch_sizes, file.epoch_sizes, explicit("epoch_sizes"));
        keep_or_replace(&mut self.block_number, file.block_number, explicit("block_number"));
        keep_or_replace(&mut self.header_size, file.header_size, explicit("header_size"));
        keep_or_replace(&mut self.header_hex, file.header_hex, explicit("header_hex"));
        keep_or_replace(&mut self.difficulty, file.difficulty, explicit("difficulty"));
        keep_or_replace(&mut self.time_limit, file.time_limit, explicit("time_limit"));
        keep_or_replace(&mut self.threads, file.threads, explicit("threads"));
        keep_or_replace(&mut self.nonce, file.nonce, explicit("nonce"));
        keep_or_replace(&mut self.mix_digest, file.mix_digest, explicit("mix_digest"));
        keep_or_replace(&mut self.dataset_path, file.dataset_path, explicit("dataset_path"));
        keep_or_replace(&mut self.verbose, file.verbose, explicit("verbose"));
        keep_or_replace(&mut self.log_level, file.log_level, explicit("log_level"));
        keep_or_replace(&mut self.log_format, file.log_format, explicit("log_format"));
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.epoch_sizes {
            if self.cache_size == 0 || self.cache_size % HASH_BYTES != 0 {
                return Err(Error::config(format!(
                    "Cache size {} must be a positive multiple of {}",
                    self.cache_size, HASH_BYTES
                )));
            }
            if self.full_size % HASH_BYTES != 0 || self.full_size < HASH_BYTES * MIX_LANES {
                return Err(Error::config(format!(
                    "Dataset size {} must be a multiple of {} and at least {}",
                    self.full_size,
                    HASH_BYTES,
                    HASH_BYTES * MIX_LANES
                )));
            }
        }

        if self.epoch_sizes {
            self.sizes()?;
        }

        if self.difficulty == 0 {
            return Err(Error::config("Difficulty must be greater than 0"));
        }

        if self.time_limit == 0 {
            return Err(Error::config("Time limit must be greater than 0"));
        }

        if self.header_hex.is_some() {
            self.header()?;
        }

        if self.mode == Mode::Verify {
            if self.nonce.is_none() {
                return Err(Error::config("Verify mode requires --nonce"));
            }
            if self.mix_digest()?.is_none() {
                return Err(Error::config("Verify mode requires --mix-digest"));
            }
        }

        Ok(())
    }

    /// Cache and dataset sizes in bytes
    pub fn sizes(&self) -> Result<(usize, usize)> {
        if !self.epoch_sizes {
            return Ok((self.cache_size, self.full_size));
        }

        let epoch = epoch::epoch_of(self.block_number);
        let cache_size = usize::try_from(epoch::cache_size(epoch)?)
            .map_err(|_| Error::config("Cache size does not fit in memory"))?;
        let full_size = usize::try_from(epoch::full_size(epoch)?)
            .map_err(|_| Error::config("Dataset size does not fit in memory"))?;
        Ok((cache_size, full_size))
    }

    /// Seed for the configured block
    pub fn seed(&self) -> Result<EpochSeed> {
        EpochSeed::for_block(self.block_number)
    }

    /// Header to mine
    pub fn header(&self) -> Result<Header> {
        match &self.header_hex {
            Some(hex) => Header::from_hex(hex, self.header_size),
            None => Ok(Header::zeroed(self.header_size)),
        }
    }

    /// Target derived from the difficulty
    pub fn target(&self) -> Result<Target> {
        Target::from_difficulty(self.difficulty)
    }

    /// Configured nonce, or a random one
    pub fn initial_nonce(&self) -> Nonce {
        self.nonce.map(Nonce::new).unwrap_or_else(Nonce::random)
    }

    /// Parsed mix digest, if given
    pub fn mix_digest(&self) -> Result<Option<[u8; DIGEST_SIZE]>> {
        let Some(hex) = &self.mix_digest else {
            return Ok(None);
        };
        let bytes = hex::decode(hex.trim_start_matches("0x"))
            .map_err(|e| Error::format(format!("Invalid mix digest hex: {}", e)))?;
        let digest = bytes.as_slice().try_into().map_err(|_| {
            Error::format(format!(
                "Mix digest must be {} bytes, got {}",
                DIGEST_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Some(digest))
    }
}

fn keep_or_replace<T>(cli: &mut T, file: T, explicit: bool) {
    if !explicit {
        *cli = file;
    }
}

// Default value functions for serde
fn default_mode() -> Mode { Mode::Full }
fn default_cache_size() -> usize { 16_776_896 }
fn default_full_size() -> usize { 16_776_896 }
fn default_block_number() -> u64 { 1 }
fn default_header_size() -> usize { DEFAULT_HEADER_SIZE }
fn default_difficulty() -> u64 { 0x4000 }
fn default_time_limit() -> u64 { 1_000_000 }
fn default_threads() -> usize { 1 }
fn default_dataset_path() -> PathBuf { PathBuf::from("ethash-dataset.bin") }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_format() -> LogFormat { LogFormat::Text }
