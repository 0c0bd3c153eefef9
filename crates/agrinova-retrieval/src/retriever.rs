//! Query front-end: owns the corpus, the index and the one embedding function
//! both were built with.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use agrinova_embeddings::{EmbeddingError, EmbeddingService};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::advisory::AdvisoryRecord;
use crate::errors::{Result, RetrievalError};
use crate::gate::EmbeddingGate;
use crate::index::RetrievalIndex;
use crate::top_k::TopK;

/// Build and query-time limits.
#[derive(Clone, Debug)]
pub struct RetrieverOptions {
    /// Texts per embedding call during the build.
    pub batch_size: usize,
    /// Concurrent query-time embedding calls.
    pub max_concurrency: usize,
    /// Per-call timeout for query-time embedding.
    pub timeout: Option<Duration>,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            max_concurrency: 4,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// One retrieval result as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetrievalHit {
    /// Advisory ID.
    pub id: String,
    /// Advisory title, empty when absent.
    pub title: String,
    /// Leading characters of the advisory text.
    pub excerpt: String,
    /// Squared Euclidean distance; lower is closer.
    pub score: f32,
}

/// Immutable retrieval service shared by all request handlers.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingService>,
    records: Vec<AdvisoryRecord>,
    index: RetrievalIndex,
    gate: EmbeddingGate,
}

impl fmt::Debug for Retriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriever")
            .field("documents", &self.index.len())
            .field("dimensions", &self.embedder.dimensions())
            .field("max_concurrency", &self.gate.max_concurrency())
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Embed every record and build the index.
    ///
    /// An empty corpus produces an empty index without calling the embedder.
    pub async fn build(
        embedder: Arc<dyn EmbeddingService>,
        records: Vec<AdvisoryRecord>,
        options: &RetrieverOptions,
    ) -> Result<Self> {
        let dimensions = embedder.dimensions();
        let batch_size = options.batch_size.max(1);

        let mut rows = Vec::with_capacity(records.len());
        for (batch_no, batch) in records.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
            let vectors = embedder.embed(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(RetrievalError::Build(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            debug!(batch = batch_no, size = texts.len(), "embedded corpus batch");
            rows.extend(vectors);
        }

        let index = RetrievalIndex::build(dimensions, rows)?;
        if index.is_empty() {
            tracing::warn!("retrieval index is empty, queries will return no results");
        } else {
            info!(documents = index.len(), dimensions, "retrieval index built");
        }

        Ok(Self {
            embedder,
            records,
            index,
            gate: EmbeddingGate::new(options.max_concurrency, options.timeout),
        })
    }

    /// Nearest advisories to `text`, closest first.
    ///
    /// Returns no results (and skips embedding) when the index is empty or
    /// `top_k` is zero. Embedding failures are errors, never empty results.
    #[instrument(skip(self, text), fields(top_k = top_k.get(), text_len = text.len()))]
    pub async fn retrieve(&self, text: &str, top_k: TopK) -> Result<Vec<RetrievalHit>> {
        let k = top_k.get();
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embed(text).await?;
        let neighbors = self.index.search(&query, k)?;

        let hits = neighbors
            .into_iter()
            .filter_map(|n| {
                self.records.get(n.position).map(|record| RetrievalHit {
                    id: record.id.clone(),
                    title: record.title_or_empty().to_string(),
                    excerpt: record.excerpt().to_string(),
                    score: n.distance,
                })
            })
            .collect();
        Ok(hits)
    }

    /// Embed a single text with the index's embedding function.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        let vector = self
            .gate
            .run(async move { embedder.embed_single(&text).await })
            .await?;
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }
        Ok(vector)
    }

    /// Number of indexed advisories.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index holds no advisories.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Embedding dimension fixed at startup.
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    /// Whether the embedding function reports ready.
    pub fn embedder_ready(&self) -> bool {
        self.embedder.is_ready()
    }

    /// Admission gate, for health reporting.
    pub fn gate(&self) -> &EmbeddingGate {
        &self.gate
    }
}
