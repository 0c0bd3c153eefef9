//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a user file
//! only needs the keys it overrides.

mod language;
mod models;
mod server;

pub use language::*;
pub use models::*;
pub use server::*;

use agrinova_core::LogFormat;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the AgriNova ML service.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "embedding": { "backend": "onnx", "maxConcurrency": 2 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgriSettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Advisory corpus location.
    pub corpus: CorpusSettings,
    /// Embedding backend and query concurrency.
    pub embedding: EmbeddingSettings,
    /// ASR sidecar.
    pub transcription: TranscriptionSettings,
    /// Translation sidecar.
    pub translation: TranslationSettings,
    /// Speech synthesis backend.
    pub tts: TtsSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl AgriSettings {
    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.max_concurrency == 0 {
            return Err(SettingsError::InvalidValue(
                "embedding.maxConcurrency must be at least 1".into(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(SettingsError::InvalidValue(
                "embedding.batchSize must be at least 1".into(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(SettingsError::InvalidValue(
                "embedding.dimensions must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AgriSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut settings = AgriSettings::default();
        settings.embedding.max_concurrency = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("maxConcurrency"));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let mut settings = AgriSettings::default();
        settings.embedding.batch_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: AgriSettings =
            serde_json::from_str(r#"{"server": {"port": 9100}}"#).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.embedding.max_concurrency, 4);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(AgriSettings::default()).unwrap();
        assert!(json["embedding"]["maxConcurrency"].is_number());
        assert!(json["server"]["maxBodyBytes"].is_number());
        assert_eq!(json["logging"]["format"], "compact");
    }
}
