//! `POST /transcribe`: speech-to-text for an uploaded audio file.
//!
//! Failures of the ASR backend are reported inside the `text` field with a
//! 200 status, so clients that only read `text` keep working.

use agrinova_core::Capability;
use axum::Json;
use axum::extract::{Multipart, Query, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::ApiError;
use crate::server::AppState;

/// Text returned when no ASR backend is configured.
pub const ASR_UNAVAILABLE_TEXT: &str = "ASR model not available.";

/// Query string.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TranscribeQuery {
    /// Expected spoken language. The backend auto-detects; this is logged only.
    pub lang: String,
}

impl Default for TranscribeQuery {
    fn default() -> Self {
        Self { lang: "ml".into() }
    }
}

/// Response body.
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    /// Recognized text, or a human-readable failure.
    pub text: String,
}

struct Upload {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: Option<String>,
}

/// Handle `POST /transcribe` with a multipart `file` part.
#[instrument(skip_all)]
pub async fn transcribe(
    State(state): State<AppState>,
    Query(query): Query<TranscribeQuery>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let upload = read_file_part(multipart).await?;
    debug!(bytes = upload.bytes.len(), mime = %upload.mime_type, lang = %query.lang, "audio received");

    let client = match &state.context.transcription {
        Capability::Available(client) => client,
        Capability::Unavailable { .. } => {
            return Ok(Json(TranscribeResponse {
                text: ASR_UNAVAILABLE_TEXT.into(),
            }));
        }
    };

    let text = match client
        .transcribe(upload.bytes, &upload.mime_type, upload.file_name.as_deref(), None)
        .await
    {
        Ok(transcript) => transcript.text,
        Err(e) => {
            warn!(error = %e, "transcription failed");
            format!("Transcription failed: {e}")
        }
    };
    Ok(Json(TranscribeResponse { text }))
}

async fn read_file_part(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok(Upload {
            bytes: bytes.to_vec(),
            mime_type,
            file_name,
        });
    }
    Err(ApiError::BadRequest("missing multipart field `file`".into()))
}
