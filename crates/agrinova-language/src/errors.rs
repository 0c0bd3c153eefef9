//! Language service error types.

use thiserror::Error;

/// Errors from the transcription, translation and synthesis clients.
#[derive(Debug, Error)]
pub enum LanguageError {
    /// The capability was not resolved at startup.
    #[error("{0}")]
    NotAvailable(String),
    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The backend answered with an unexpected payload.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Uploaded audio exceeds the configured limit.
    #[error("audio too large: {size} bytes (max {max})")]
    AudioTooLarge {
        /// Received size.
        size: u64,
        /// Configured maximum.
        max: u64,
    },
    /// The caller supplied unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Writing output to disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for language operations.
pub type Result<T> = std::result::Result<T, LanguageError>;
