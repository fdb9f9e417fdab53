//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No route matched the request.
    #[error("No route for {0} {1}")]
    NotFound(Method, String),

    /// The request exceeded the configured size limit.
    #[error("Request larger than {0} bytes")]
    RequestTooLarge(usize),
}
