//! Source error types.

use thiserror::Error;

use jobharvest_core::CoreError;

/// Errors from resolving or validating source descriptors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No source is registered under the name.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// A descriptor cannot produce working requests.
    #[error("Invalid source descriptor {id}: {reason}")]
    InvalidDescriptor {
        /// Descriptor id.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two descriptors claim the same id or alias.
    #[error("Source name {name} is claimed by both {first} and {second}")]
    DuplicateName {
        /// The contested name.
        name: String,
        /// Id of the descriptor registered first.
        first: String,
        /// Id of the descriptor registered second.
        second: String,
    },

    /// The descriptor's paging configuration is invalid.
    #[error(transparent)]
    Config(#[from] CoreError),
}

impl SourceError {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
