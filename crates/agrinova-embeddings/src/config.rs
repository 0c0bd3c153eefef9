//! Embedding configuration.

use agrinova_settings::{EmbeddingBackend, EmbeddingSettings};
use serde::{Deserialize, Serialize};

/// Configuration for an embedding backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// Backend implementation.
    pub backend: EmbeddingBackend,
    /// `HuggingFace` model identifier (ONNX backend).
    pub model: String,
    /// Output dimensions.
    pub dimensions: usize,
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
    /// Token limit per input; longer inputs are truncated.
    pub max_sequence_length: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default())
    }
}

impl EmbeddingConfig {
    /// Create config from settings.
    pub fn from_settings(s: &EmbeddingSettings) -> Self {
        Self {
            backend: s.backend,
            model: s.model.clone(),
            dimensions: s.dimensions,
            cache_dir: s.cache_dir.clone(),
            max_sequence_length: 256,
        }
    }

    /// Resolve the cache directory, expanding `~/` to the home directory.
    pub fn resolved_cache_dir(&self) -> String {
        if let Some(rest) = self.cache_dir.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return format!("{home}/{rest}");
            }
        }
        self.cache_dir.clone()
    }
}
