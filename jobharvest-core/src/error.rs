//! Core error types for `jobharvest`.

use thiserror::Error;

/// Core error type for `jobharvest` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid source or run configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data that does not fit the model (e.g. a non-object record).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
