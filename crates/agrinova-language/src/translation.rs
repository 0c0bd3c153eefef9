//! English/Malayalam translation through a translation sidecar.
//!
//! Only `en* -> ml*` and `ml* -> en*` are routed to the model. Any other pair,
//! an unavailable sidecar or a failed call echoes the input text back.

use std::time::Duration;

use agrinova_core::Capability;
use agrinova_settings::TranslationSettings;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::{LanguageError, Result};
use crate::probe::{PROBE_TIMEOUT, probe};

/// A language pair the model supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// English to Malayalam.
    EnToMl,
    /// Malayalam to English.
    MlToEn,
}

impl Direction {
    /// Pick the model direction for a requested pair, by language prefix.
    pub fn route(src: &str, tgt: &str) -> Option<Self> {
        let src = src.to_lowercase();
        let tgt = tgt.to_lowercase();
        if src.starts_with("en") && tgt.starts_with("ml") {
            Some(Self::EnToMl)
        } else if src.starts_with("ml") && tgt.starts_with("en") {
            Some(Self::MlToEn)
        } else {
            None
        }
    }

    /// Source language code.
    pub fn source(self) -> &'static str {
        match self {
            Self::EnToMl => "en",
            Self::MlToEn => "ml",
        }
    }

    /// Target language code.
    pub fn target(self) -> &'static str {
        match self {
            Self::EnToMl => "ml",
            Self::MlToEn => "en",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
    max_length: u32,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// HTTP client for the translation sidecar.
#[derive(Clone, Debug)]
pub struct TranslationClient {
    client: reqwest::Client,
    base_url: String,
    max_length: u32,
}

impl TranslationClient {
    /// Build a client from settings. Does not contact the sidecar.
    pub fn new(settings: &TranslationSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_length: settings.max_length,
        })
    }

    /// Translate `text` in the given direction.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn translate(&self, text: &str, direction: Direction) -> Result<String> {
        let body = TranslateRequest {
            text,
            source: direction.source(),
            target: direction.target(),
            max_length: self.max_length,
        };
        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LanguageError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| LanguageError::InvalidResponse(format!("translation response: {e}")))?;
        Ok(parsed.translation)
    }

    async fn check(&self) -> Result<()> {
        probe(&self.client, &self.base_url, PROBE_TIMEOUT).await
    }
}

/// Translate when possible, otherwise return the input unchanged.
pub async fn translate_or_echo(
    capability: &Capability<TranslationClient>,
    text: &str,
    src: &str,
    tgt: &str,
) -> String {
    let (Some(client), Some(direction)) = (capability.as_available(), Direction::route(src, tgt))
    else {
        return text.to_string();
    };
    if text.is_empty() {
        return String::new();
    }
    match client.translate(text, direction).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(error = %e, ?direction, "translation failed, echoing input");
            text.to_string()
        }
    }
}

/// Resolve the translation capability once at startup.
pub async fn resolve(settings: &TranslationSettings) -> Capability<TranslationClient> {
    if !settings.enabled {
        info!("translation disabled in settings");
        return Capability::unavailable("translation disabled");
    }
    let client = match TranslationClient::new(settings) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "failed to build translation client");
            return Capability::unavailable(e.to_string());
        }
    };
    match client.check().await {
        Ok(()) => {
            info!(base_url = %settings.base_url, "translation sidecar available");
            Capability::Available(client)
        }
        Err(e) => {
            warn!(base_url = %settings.base_url, error = %e, "translation sidecar unreachable, translation will echo input");
            Capability::unavailable(format!("translation sidecar unreachable: {e}"))
        }
    }
}
