//! `POST /embed`: raw embedding vector for a text.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::errors::ApiError;
use crate::metrics::{EMBED_REQUESTS_TOTAL, record_retrieval_error};
use crate::server::AppState;

/// Request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmbedRequest {
    /// Text to embed; empty when omitted.
    pub text: String,
}

/// Response body.
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    /// The embedding, `dimensions` long.
    pub vector: Vec<f32>,
}

/// Handle `POST /embed`.
#[instrument(skip_all)]
pub async fn embed(
    State(state): State<AppState>,
    Json(req): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    metrics::counter!(EMBED_REQUESTS_TOTAL).increment(1);
    let vector = state.context.retriever.embed(&req.text).await.map_err(|e| {
        record_retrieval_error("embed", &e);
        ApiError::from(e)
    })?;
    Ok(Json(EmbedResponse { vector }))
}
