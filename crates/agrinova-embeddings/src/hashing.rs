//! Lexical feature-hashing embedder.
//!
//! Each token is hashed with SHA-256 into one of `dimensions` buckets with a
//! hash-derived sign, term counts are accumulated and the result is
//! L2-normalized. Texts sharing words land close together under Euclidean
//! distance, which is enough for keyword-heavy advisory queries and needs no
//! model download.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::normalize::l2_normalize;
use crate::service::EmbeddingService;

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbeddingService {
    dims: usize,
}

impl HashingEmbeddingService {
    /// Create an embedder producing `dims`-dimensional vectors.
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            let (bucket, sign) = self.bucket(&token);
            v[bucket] += sign;
        }
        l2_normalize(&mut v);
        v
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let hash = Sha256::digest(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash[..8]);
        let n = u64::from_le_bytes(head);
        #[allow(clippy::cast_possible_truncation)]
        let bucket = (n % self.dims as u64) as usize;
        let sign = if hash[8] & 1 == 0 { 1.0 } else { -1.0 };
        (bucket, sign)
    }
}

/// Lower-cased tokens split on whitespace and ASCII punctuation.
///
/// Non-ASCII scripts (e.g. Malayalam with combining vowel signs) stay intact
/// within a word.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingService for HashingEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn is_model_cached(&self) -> bool {
        true
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}
