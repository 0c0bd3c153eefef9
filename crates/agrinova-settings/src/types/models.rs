use serde::{Deserialize, Serialize};

/// Which embedding implementation backs retrieval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Lexical feature hashing. No model download.
    #[default]
    Hashing,
    /// Sentence-transformer model run through ONNX Runtime.
    Onnx,
}

/// Embedding model and query-path limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Backend implementation.
    pub backend: EmbeddingBackend,
    /// `HuggingFace` model ID (ONNX backend).
    pub model: String,
    /// Output dimensions. Fixed for the process lifetime.
    pub dimensions: usize,
    /// Texts per embedding call while building the index.
    pub batch_size: usize,
    /// Maximum embedding calls in flight; excess requests wait.
    pub max_concurrency: usize,
    /// Per-call timeout in milliseconds (0 disables).
    pub timeout_ms: u64,
    /// Model cache directory (`~/` is expanded).
    pub cache_dir: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hashing,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_concurrency: 4,
            timeout_ms: 30_000,
            cache_dir: "~/.agrinova/models".to_string(),
        }
    }
}
