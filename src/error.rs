//! Error handling for the Ethash miner
//!
//! A single error type covers every stage of the pipeline, from decoding raw
//! bytes to reading lanes back from a persisted dataset.

use thiserror::Error;

/// Result type alias for Ethash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Ethash miner
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed byte input (wrong length, bad hex, misaligned buffer)
    #[error("Format error: {0}")]
    Format(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lane could not be read in full from a dataset file
    #[error("Dataset truncated: lane {index} unreadable at byte offset {offset}")]
    TruncatedDataset {
        /// Lane index that was requested
        index: usize,
        /// Byte offset of the lane in the file
        offset: u64,
    },

    /// Cache or dataset size is not usable
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Target or difficulty is not usable
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Seed derivation is only available for the genesis epoch
    #[error("Unsupported epoch {0}: only epoch 0 has a seed")]
    UnsupportedEpoch(u64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON configuration parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Worker errors
    #[error("Worker error: {0}")]
    Worker(String),

    /// Mining was cancelled before it reached a terminal state
    #[error("Operation was cancelled: {0}")]
    Cancelled(String),
}

impl Error {
    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a truncated dataset error for a lane index
    pub fn truncated(index: usize, offset: u64) -> Self {
        Self::TruncatedDataset { index, offset }
    }

    /// Create an invalid size error
    pub fn invalid_size(msg: impl Into<String>) -> Self {
        Self::InvalidSize(msg.into())
    }

    /// Create an invalid target error
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a worker error
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled(operation.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Format(_) => "format",
            Error::Io(_) => "io",
            Error::TruncatedDataset { .. } => "io",
            Error::InvalidSize(_) => "size",
            Error::InvalidTarget(_) => "target",
            Error::UnsupportedEpoch(_) => "epoch",
            Error::Config(_) => "config",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Worker(_) => "worker",
            Error::Cancelled(_) => "cancelled",
        }
    }
}
