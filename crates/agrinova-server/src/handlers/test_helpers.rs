//! Shared fixtures for handler and router tests.

use std::sync::Arc;
use std::time::Instant;

use agrinova_core::Capability;
use agrinova_embeddings::{EmbeddingService, HashingEmbeddingService};
use agrinova_language::{SpeechSynthesizer, TranscriptionClient, TranslationClient};
use agrinova_retrieval::{AdvisoryRecord, Retriever, RetrieverOptions};
use axum::body::Body;
use axum::http::{Request, Response, header};
use serde_json::Value;

use crate::context::ServiceContext;
use crate::server::AppState;

pub const TEST_DIMENSIONS: usize = 256;

/// The two-advisory corpus used across tests.
pub fn sample_records() -> Vec<AdvisoryRecord> {
    vec![
        AdvisoryRecord::new("a1", "apply nitrogen fertilizer before monsoon").with_title("Nitrogen timing"),
        AdvisoryRecord::new("a2", "irrigate paddy fields weekly"),
    ]
}

pub async fn make_retriever(
    embedder: Arc<dyn EmbeddingService>,
    records: Vec<AdvisoryRecord>,
) -> Arc<Retriever> {
    Arc::new(
        Retriever::build(embedder, records, &RetrieverOptions::default())
            .await
            .unwrap(),
    )
}

/// Builder for a [`ServiceContext`] with every capability unavailable.
pub struct ContextBuilder {
    embedder: Arc<dyn EmbeddingService>,
    records: Vec<AdvisoryRecord>,
    transcription: Capability<TranscriptionClient>,
    translation: Capability<TranslationClient>,
    tts: Capability<SpeechSynthesizer>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            embedder: Arc::new(HashingEmbeddingService::new(TEST_DIMENSIONS)),
            records: sample_records(),
            transcription: Capability::unavailable("transcription disabled"),
            translation: Capability::unavailable("translation disabled"),
            tts: Capability::unavailable("TTS is disabled."),
        }
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingService>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn records(mut self, records: Vec<AdvisoryRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn transcription(mut self, client: TranscriptionClient) -> Self {
        self.transcription = Capability::Available(client);
        self
    }

    pub fn translation(mut self, client: TranslationClient) -> Self {
        self.translation = Capability::Available(client);
        self
    }

    pub fn tts(mut self, synth: SpeechSynthesizer) -> Self {
        self.tts = Capability::Available(synth);
        self
    }

    pub async fn build(self) -> ServiceContext {
        let retriever = make_retriever(self.embedder, self.records).await;
        ServiceContext::new(retriever, self.transcription, self.translation, self.tts)
    }

    pub async fn state(self) -> AppState {
        AppState {
            context: Arc::new(self.build().await),
            metrics: None,
            start_time: Instant::now(),
        }
    }
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Response body as JSON, or `Value::Null` for non-JSON bodies such as
/// extractor rejections.
pub async fn body_json(resp: Response<Body>) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
