//! `POST /tts`: synthesize speech to an MP3 file.

use agrinova_core::Capability;
use agrinova_language::SynthesizedAudio;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use crate::errors::ApiError;
use crate::server::AppState;

/// Request body.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TtsRequest {
    /// Text to speak.
    pub text: String,
    /// Voice language; `ml*` selects Malayalam, anything else English.
    pub lang: String,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            lang: "ml".into(),
        }
    }
}

/// Handle `POST /tts`.
#[instrument(skip_all)]
pub async fn tts(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Json<SynthesizedAudio>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text for TTS is missing.".into()));
    }
    let synth = match &state.context.tts {
        Capability::Available(synth) => synth,
        Capability::Unavailable { reason } => return Err(ApiError::Unavailable(reason.clone())),
    };
    let audio = synth.synthesize(&req.text, &req.lang).await?;
    Ok(Json(audio))
}
