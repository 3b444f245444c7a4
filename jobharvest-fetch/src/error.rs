//! Harvest error types.
//!
//! Only [`DiscoveryError`] (wrapped in [`HarvestError`]) ends a run.
//! [`FetchError`]s from single pages or items are absorbed into the
//! `HarvestResult` failure list and never abort sibling fetches.

use std::time::Duration;
use thiserror::Error;

use jobharvest_core::CoreError;

// ============================================================================
// Fetch Error
// ============================================================================

/// Failure of one page or item fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx response.
    #[error("Unexpected status code: {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// Response received but not interpretable.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The detail body signalled that the item does not exist.
    #[error("Item not found")]
    NotFound,

    /// The adapter could not build a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Failure reported by a non-HTTP transport.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Returns true for statuses the sources use to throttle (429 and 403).
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Status { code: 429 | 403 })
    }

    /// Returns true if the fetch timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

// ============================================================================
// Decode Error
// ============================================================================

/// A response body that could not be interpreted.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is absent.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Field is present but has the wrong shape.
    #[error("Unexpected shape at {field}: {detail}")]
    UnexpectedShape {
        /// Field or pointer that was inspected.
        field: String,
        /// What was wrong with it.
        detail: String,
    },
}

// ============================================================================
// Discovery Error
// ============================================================================

/// The probe request could not establish a total count.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The probe request itself failed.
    #[error("Probe request failed: {0}")]
    Probe(#[source] FetchError),

    /// The probe response carries no total count.
    #[error("Total count missing from probe response: {0}")]
    MissingTotalCount(String),

    /// The probe response could not be decoded.
    #[error("Probe response could not be decoded: {0}")]
    Undecodable(#[source] DecodeError),
}

impl From<DecodeError> for DiscoveryError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::MissingField(field) => Self::MissingTotalCount(field),
            other => Self::Undecodable(other),
        }
    }
}

// ============================================================================
// Harvest Error
// ============================================================================

/// Error that fails a whole harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Discovery failed; no page plan could be built.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The source configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
}

// ============================================================================
// Tests
// ============================================================================
