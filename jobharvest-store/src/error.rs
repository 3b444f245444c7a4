//! Store error types.

use thiserror::Error;

use jobharvest_sources::SourceError;

/// Errors that can occur while loading configuration or writing output.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source resolution error.
    #[error(transparent)]
    Source(#[from] SourceError),
}
