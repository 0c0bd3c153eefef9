//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`AgriSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply `AGRINOVA_*` environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{AgriSettings, EmbeddingBackend};
use agrinova_core::LogFormat;

/// Resolve the path to the settings file (`~/.agrinova/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".agrinova").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<AgriSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or values that fail
/// [`AgriSettings::validate`] are errors.
pub fn load_settings_from_path(path: &Path) -> Result<AgriSettings> {
    let mut settings = load_file_layers(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn load_file_layers(path: &Path) -> Result<AgriSettings> {
    let defaults = serde_json::to_value(AgriSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (file/default value wins).
pub fn apply_env_overrides(settings: &mut AgriSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup (tests inject a map).
fn apply_overrides_from(settings: &mut AgriSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.read_string("AGRINOVA_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.read_u16("AGRINOVA_PORT", 0, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.read_usize("AGRINOVA_MAX_BODY_BYTES", 1024, 1_073_741_824) {
        settings.server.max_body_bytes = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_CORPUS_PATH") {
        settings.corpus.path = v;
    }

    // ── Embedding ───────────────────────────────────────────────────
    if let Some(v) = env.read_string("AGRINOVA_EMBED_BACKEND") {
        match parse_backend(&v) {
            Some(backend) => settings.embedding.backend = backend,
            None => tracing::warn!(key = "AGRINOVA_EMBED_BACKEND", value = %v, "unknown embedding backend, ignoring"),
        }
    }
    if let Some(v) = env.read_string("AGRINOVA_EMBED_MODEL") {
        settings.embedding.model = v;
    }
    if let Some(v) = env.read_usize("AGRINOVA_EMBED_CONCURRENCY", 1, 1024) {
        settings.embedding.max_concurrency = v;
    }
    if let Some(v) = env.read_usize("AGRINOVA_EMBED_BATCH_SIZE", 1, 4096) {
        settings.embedding.batch_size = v;
    }
    if let Some(v) = env.read_u64("AGRINOVA_EMBED_TIMEOUT_MS", 0, 3_600_000) {
        settings.embedding.timeout_ms = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_MODEL_CACHE_DIR") {
        settings.embedding.cache_dir = v;
    }

    // ── Language sidecars ───────────────────────────────────────────
    if let Some(v) = env.read_bool("AGRINOVA_TRANSCRIBE_ENABLED") {
        settings.transcription.enabled = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_TRANSCRIBE_URL") {
        settings.transcription.base_url = v;
    }
    if let Some(v) = env.read_u64("AGRINOVA_TRANSCRIBE_TIMEOUT_MS", 1000, 3_600_000) {
        settings.transcription.timeout_ms = v;
    }
    if let Some(v) = env.read_bool("AGRINOVA_TRANSLATE_ENABLED") {
        settings.translation.enabled = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_TRANSLATE_URL") {
        settings.translation.base_url = v;
    }
    if let Some(v) = env.read_bool("AGRINOVA_TTS_ENABLED") {
        settings.tts.enabled = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_TTS_URL") {
        settings.tts.base_url = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_TTS_OUTPUT_DIR") {
        settings.tts.output_dir = Some(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.read_string("AGRINOVA_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.read_string("AGRINOVA_LOG_FORMAT") {
        match v.to_lowercase().as_str() {
            "json" => settings.logging.format = LogFormat::Json,
            "compact" => settings.logging.format = LogFormat::Compact,
            _ => tracing::warn!(key = "AGRINOVA_LOG_FORMAT", value = %v, "unknown log format, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse an embedding backend name.
pub fn parse_backend(val: &str) -> Option<EmbeddingBackend> {
    match val.to_lowercase().as_str() {
        "hashing" => Some(EmbeddingBackend::Hashing),
        "onnx" => Some(EmbeddingBackend::Onnx),
        _ => None,
    }
}

// ── Env var readers ─────────────────────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn read_string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, name: &str, kind: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let val = (self.lookup)(name)?;
        let result = parse(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, kind, "invalid env var, ignoring");
        }
        result
    }

    fn read_bool(&self, name: &str) -> Option<bool> {
        self.parsed(name, "bool", parse_bool)
    }

    fn read_u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        self.parsed(name, "u16", |v| parse_u16_range(v, min, max))
    }

    fn read_u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        self.parsed(name, "u64", |v| parse_u64_range(v, min, max))
    }

    fn read_usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        self.parsed(name, "usize", |v| parse_usize_range(v, min, max))
    }
}
