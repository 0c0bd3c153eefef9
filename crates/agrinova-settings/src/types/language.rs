use serde::{Deserialize, Serialize};

/// ASR sidecar settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// Whether to try the sidecar at startup.
    pub enabled: bool,
    /// Base URL of the transcription service.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum audio payload in bytes.
    pub max_bytes: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:8001".to_string(),
            timeout_ms: 120_000,
            max_bytes: 52_428_800,
        }
    }
}

/// Translation sidecar settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationSettings {
    /// Whether to try the sidecar at startup.
    pub enabled: bool,
    /// Base URL of the translation service.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Generation length cap forwarded to the model.
    pub max_length: u32,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:8002".to_string(),
            timeout_ms: 30_000,
            max_length: 400,
        }
    }
}

/// Speech synthesis settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TtsSettings {
    /// Whether synthesis is offered.
    pub enabled: bool,
    /// Google Translate TTS compatible endpoint.
    pub base_url: String,
    /// Request timeout per chunk in milliseconds.
    pub timeout_ms: u64,
    /// Directory for generated MP3 files (system temp dir when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://translate.google.com/translate_tts".to_string(),
            timeout_ms: 30_000,
            output_dir: None,
        }
    }
}
