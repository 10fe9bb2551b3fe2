//! Error types for the entropy client layer.
//!
//! These never cross [`crate::EntropySource`] — the source swallows them
//! and falls back locally.

use thiserror::Error;

/// Errors from the remote randomness client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EntropyError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),

    /// The service answered but flagged the request as unsuccessful.
    #[error("service reported success = false")]
    Unsuccessful,

    /// The payload held fewer numbers than requested.
    #[error("service returned {got} numbers, requested {requested}")]
    ShortPayload {
        /// Numbers received.
        got: usize,
        /// Numbers requested.
        requested: usize,
    },
}

/// Result type for client operations.
pub type EntropyResult<T> = Result<T, EntropyError>;
