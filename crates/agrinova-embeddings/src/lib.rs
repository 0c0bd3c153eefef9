//! # agrinova-embeddings
//!
//! Text embedding backends behind a single [`EmbeddingService`] trait:
//!
//! - [`HashingEmbeddingService`]: lexical feature hashing, always available
//! - `OnnxEmbeddingService`: sentence-transformer via `ort` (feature `ort`)
//! - [`MockEmbeddingService`]: deterministic whole-text hashing for tests
//!
//! [`create_embedding_service`] picks the backend from configuration and
//! returns it ready for inference.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod hashing;
pub mod normalize;
#[cfg(feature = "ort")]
pub mod ort_service;
pub mod service;

use std::sync::Arc;

use agrinova_settings::EmbeddingBackend;

pub use config::EmbeddingConfig;
pub use errors::{EmbeddingError, Result};
pub use hashing::HashingEmbeddingService;
#[cfg(feature = "ort")]
pub use ort_service::OnnxEmbeddingService;
pub use service::{EmbeddingService, MockEmbeddingService};

/// Build and initialize the configured embedding backend.
///
/// Returns only once the service can embed, so callers can build the index
/// right after.
pub async fn create_embedding_service(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>> {
    match config.backend {
        EmbeddingBackend::Hashing => {
            tracing::info!(dimensions = config.dimensions, "using hashing embedding backend");
            Ok(Arc::new(HashingEmbeddingService::new(config.dimensions)))
        }
        EmbeddingBackend::Onnx => create_onnx(config).await,
    }
}

#[cfg(feature = "ort")]
async fn create_onnx(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>> {
    let svc = OnnxEmbeddingService::new(config.clone());
    svc.initialize().await?;
    Ok(Arc::new(svc))
}

#[cfg(not(feature = "ort"))]
#[allow(clippy::unused_async)]
async fn create_onnx(_config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>> {
    Err(EmbeddingError::ModelInit(
        "onnx backend requested but this build lacks the `ort` feature".into(),
    ))
}
