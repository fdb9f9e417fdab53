//! Error types for the mock layer.

use thiserror::Error;

use crate::server::Error as ServerError;

/// Errors surfaced by [`MockServer`](crate::mock::MockServer).
#[derive(Debug, Error)]
pub enum Error {
    /// The serialization format is neither `json` nor `xml`.
    #[error("Unsupported serialization format: {0:?} (expected \"json\" or \"xml\")")]
    InvalidFormat(String),

    /// The underlying HTTP server failed, typically while binding.
    #[error(transparent)]
    Server(#[from] ServerError),
}
