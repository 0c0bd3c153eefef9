//! Retrieval error types.

use std::path::PathBuf;

use agrinova_embeddings::EmbeddingError;
use thiserror::Error;

/// Errors from corpus loading, index building and querying.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The corpus file exists but could not be read.
    #[error("failed to read corpus {path}: {source}")]
    CorpusRead {
        /// Corpus location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The corpus file is not a JSON array of advisory records.
    #[error("failed to parse corpus {path}: {source}")]
    CorpusParse {
        /// Corpus location.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The embedding function failed. Distinct from an empty result.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    /// The embedding function returned vectors that cannot form an index.
    #[error("index build failed: {0}")]
    Build(String),
}

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
