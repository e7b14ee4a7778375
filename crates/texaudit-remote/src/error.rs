//! Remote lookup error types.

use thiserror::Error;

/// Errors from a single metadata lookup.
///
/// These never abort a run: the matcher turns each one into a `not_found`
/// status for the entry that triggered it.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, trimmed.
        message: String,
    },

    /// The configured request timeout is not a usable duration.
    #[error("invalid remote timeout: {0} seconds")]
    InvalidTimeout(f64),

    /// The response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
