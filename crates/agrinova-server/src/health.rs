//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

use crate::context::ServiceContext;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Whether the index holds at least one advisory.
    pub index_ready: bool,
    /// Indexed advisory count.
    pub documents: usize,
    /// Embedding dimension.
    pub dimensions: usize,
    /// Whether the embedding function reports ready.
    pub embedding_ready: bool,
    /// Whether transcription is available.
    pub asr_ready: bool,
    /// Whether translation is routed to a model.
    pub translation_ready: bool,
    /// Whether speech synthesis is available.
    pub tts_ready: bool,
    /// Seconds since the server started.
    pub uptime_secs: u64,
}

/// Build a health response from the service context.
pub fn health_check(start_time: Instant, ctx: &ServiceContext) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        index_ready: !ctx.retriever.is_empty(),
        documents: ctx.retriever.len(),
        dimensions: ctx.retriever.dimensions(),
        embedding_ready: ctx.retriever.embedder_ready(),
        asr_ready: ctx.transcription.is_available(),
        translation_ready: ctx.translation.is_available(),
        tts_ready: ctx.tts.is_available(),
        uptime_secs: start_time.elapsed().as_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agrinova_core::Capability;
    use agrinova_embeddings::HashingEmbeddingService;
    use agrinova_retrieval::{AdvisoryRecord, Retriever, RetrieverOptions};

    async fn context(records: Vec<AdvisoryRecord>) -> ServiceContext {
        let retriever = Retriever::build(
            Arc::new(HashingEmbeddingService::new(16)),
            records,
            &RetrieverOptions::default(),
        )
        .await
        .unwrap();
        ServiceContext::new(
            Arc::new(retriever),
            Capability::unavailable("off"),
            Capability::unavailable("off"),
            Capability::unavailable("off"),
        )
    }

    #[tokio::test]
    async fn status_is_ok() {
        let resp = health_check(Instant::now(), &context(vec![]).await);
        assert_eq!(resp.status, "ok");
        assert!(resp.uptime_secs < 2);
    }

    #[tokio::test]
    async fn empty_index_not_ready() {
        let resp = health_check(Instant::now(), &context(vec![]).await);
        assert!(!resp.index_ready);
        assert_eq!(resp.documents, 0);
        assert_eq!(resp.dimensions, 16);
        assert!(resp.embedding_ready);
    }

    #[tokio::test]
    async fn reports_documents_and_capabilities() {
        let ctx = context(vec![AdvisoryRecord::new("a1", "mulch coconut basins")]).await;
        let resp = health_check(Instant::now(), &ctx);
        assert!(resp.index_ready);
        assert_eq!(resp.documents, 1);
        assert!(!resp.asr_ready);
        assert!(!resp.translation_ready);
        assert!(!resp.tts_ready);
    }

    #[tokio::test]
    async fn uptime_increases() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(60))
            .unwrap();
        let resp = health_check(start, &context(vec![]).await);
        assert!(resp.uptime_secs >= 59);
    }

    #[tokio::test]
    async fn serialization() {
        let resp = health_check(Instant::now(), &context(vec![]).await);
        let parsed = serde_json::to_value(&resp).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["index_ready"], false);
        assert_eq!(parsed["dimensions"], 16);
        assert!(parsed["uptime_secs"].is_number());
    }
}
