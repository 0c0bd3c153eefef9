//! Speech-to-text through an ASR sidecar.
//!
//! Audio is posted as multipart (`audio` part) to `{base_url}/transcribe`. The
//! sidecar answers `{"text": "...", "language": "..."}`.

use std::time::Duration;

use agrinova_core::Capability;
use agrinova_settings::TranscriptionSettings;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::{LanguageError, Result};
use crate::probe::{PROBE_TIMEOUT, probe};

/// Text returned by the ASR backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Recognized text.
    pub text: String,
    /// Detected language, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Map a MIME type to a filename whose extension matches the container.
///
/// Decoders sniff the extension, so m4a sent as `.wav` fails to decode.
pub fn filename_for_mime(mime_type: &str) -> String {
    let ext = match mime_type {
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => "m4a",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" | "audio/vorbis" | "audio/opus" => "ogg",
        "audio/webm" => "webm",
        "audio/flac" | "audio/x-flac" => "flac",
        _ => "wav",
    };
    format!("audio.{ext}")
}

/// HTTP client for the ASR sidecar.
#[derive(Clone, Debug)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    max_bytes: u64,
}

impl TranscriptionClient {
    /// Build a client from settings. Does not contact the sidecar.
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_bytes: settings.max_bytes,
        })
    }

    /// Largest accepted audio payload.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Transcribe `audio`. `language` is forwarded as a hint; the backend may
    /// auto-detect instead.
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        file_name: Option<&str>,
        language: Option<&str>,
    ) -> Result<Transcript> {
        let size = audio.len() as u64;
        if size > self.max_bytes {
            return Err(LanguageError::AudioTooLarge {
                size,
                max: self.max_bytes,
            });
        }

        let name = file_name.map_or_else(|| filename_for_mime(mime_type), str::to_string);
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(name)
            .mime_str(mime_type)
            .map_err(|e| LanguageError::InvalidInput(format!("mime type {mime_type}: {e}")))?;

        let mut form = reqwest::multipart::Form::new().part("audio", part);
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LanguageError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Transcript>()
            .await
            .map_err(|e| LanguageError::InvalidResponse(format!("transcription response: {e}")))
    }

    async fn check(&self) -> Result<()> {
        probe(&self.client, &self.base_url, PROBE_TIMEOUT).await
    }
}

/// Resolve the ASR capability once at startup.
pub async fn resolve(settings: &TranscriptionSettings) -> Capability<TranscriptionClient> {
    if !settings.enabled {
        info!("transcription disabled in settings");
        return Capability::unavailable("transcription disabled");
    }
    let client = match TranscriptionClient::new(settings) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "failed to build transcription client");
            return Capability::unavailable(e.to_string());
        }
    };
    match client.check().await {
        Ok(()) => {
            info!(base_url = %settings.base_url, "transcription sidecar available");
            Capability::Available(client)
        }
        Err(e) => {
            warn!(base_url = %settings.base_url, error = %e, "transcription sidecar unreachable, ASR disabled");
            Capability::unavailable(format!("transcription sidecar unreachable: {e}"))
        }
    }
}
