//! `POST /translate`: English/Malayalam translation, echoing on any failure.

use agrinova_language::translate_or_echo;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::server::AppState;

/// Request body.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranslateRequest {
    /// Text to translate.
    pub text: String,
    /// Source language tag.
    pub src: String,
    /// Target language tag.
    pub tgt: String,
}

impl Default for TranslateRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            src: "auto".into(),
            tgt: "en".into(),
        }
    }
}

/// Response body.
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Translated text, or the input when no model handles the pair.
    pub translation: String,
}

/// Handle `POST /translate`. Never fails.
#[instrument(skip_all)]
pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Json<TranslateResponse> {
    let translation = translate_or_echo(&state.context.translation, &req.text, &req.src, &req.tgt).await;
    Json(TranslateResponse { translation })
}
