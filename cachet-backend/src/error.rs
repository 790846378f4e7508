//! Error types for store operations.

use std::time::Duration;

use crate::format::FormatError;
use thiserror::Error;

/// Error type for store operations.
///
/// This enum groups the ways a store interaction can fail so the cache can
/// decide whether to fail open. Every variant is an infrastructure failure:
/// none of them should abort a request that can still be computed fresh.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal store error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// The store did not answer within the route's store timeout.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Encoding or decoding a record failed.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// Whether this error came from a corrupt or unreadable record rather than
    /// from the store itself.
    pub fn is_decode(&self) -> bool {
        matches!(self, BackendError::FormatError(FormatError::Deserialize(_)))
    }
}
