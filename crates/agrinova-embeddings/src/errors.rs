//! Embedding error types.

use thiserror::Error;

/// Errors from embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model or tokenizer could not be loaded.
    #[error("model initialization failed: {0}")]
    ModelInit(String),
    /// Tokenization or inference failed.
    #[error("inference failed: {0}")]
    Inference(String),
    /// A vector did not have the dimension the caller expected.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension fixed at startup.
        expected: usize,
        /// Dimension actually produced.
        actual: usize,
    },
    /// The embedding call exceeded its deadline.
    #[error("embedding timed out after {0} ms")]
    Timeout(u64),
    /// Service not yet initialized.
    #[error("embedding service not ready")]
    NotReady,
    /// Generic internal error (join failures, downloads).
    #[error("{0}")]
    Internal(String),
}

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
