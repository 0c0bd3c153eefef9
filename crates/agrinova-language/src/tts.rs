//! Text-to-speech through a Google Translate TTS compatible endpoint.
//!
//! The endpoint accepts at most 100 characters per request, so text is split
//! on whitespace into chunks, each chunk is fetched as MP3 and the parts are
//! concatenated into one file (MP3 frames concatenate cleanly).

use std::path::{Path, PathBuf};
use std::time::Duration;

use agrinova_core::Capability;
use agrinova_settings::TtsSettings;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::errors::{LanguageError, Result};

/// Maximum characters per upstream request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// A synthesized audio file on local disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SynthesizedAudio {
    /// File name, `tts_<unix seconds>.mp3`.
    pub filename: String,
    /// Absolute or output-dir-relative path of the file.
    pub path: String,
}

/// Voice language for a requested language tag: Malayalam for `ml*`,
/// English otherwise.
pub fn voice_language(lang: &str) -> &'static str {
    if lang.to_lowercase().starts_with("ml") {
        "ml"
    } else {
        "en"
    }
}

/// Split text into whitespace-delimited chunks of at most `max` characters.
///
/// Words longer than `max` are hard-split on character boundaries.
pub fn split_chunks(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Speech synthesis client writing MP3 files to an output directory.
#[derive(Clone, Debug)]
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    base_url: String,
    output_dir: PathBuf,
}

impl SpeechSynthesizer {
    /// Build from settings. The output directory defaults to the system temp dir.
    pub fn new(settings: &TtsSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        let output_dir = settings
            .output_dir
            .as_ref()
            .map_or_else(std::env::temp_dir, PathBuf::from);
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            output_dir,
        })
    }

    /// Directory receiving generated files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Synthesize `text` in the voice chosen by [`voice_language`] and save it.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn synthesize(&self, text: &str, lang: &str) -> Result<SynthesizedAudio> {
        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(LanguageError::InvalidInput("Text for TTS is missing.".into()));
        }
        let voice = voice_language(lang);

        let mut audio = Vec::new();
        let total = chunks.len().to_string();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, voice, idx, &total).await?;
            audio.extend_from_slice(&bytes);
        }
        debug!(chunks = chunks.len(), bytes = audio.len(), voice, "speech synthesized");

        let (filename, path) = self.write_output(&audio).await?;
        info!(path = %path.display(), "tts file written");
        Ok(SynthesizedAudio {
            filename,
            path: path.display().to_string(),
        })
    }

    async fn fetch_chunk(&self, chunk: &str, voice: &str, idx: usize, total: &str) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", voice),
                ("client", "tw-ob"),
                ("total", total),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LanguageError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(LanguageError::InvalidResponse("empty audio chunk".into()));
        }
        Ok(bytes.to_vec())
    }

    /// Write to `tts_<secs>.mp3`, adding a numeric suffix if that name is taken.
    async fn write_output(&self, audio: &[u8]) -> Result<(String, PathBuf)> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let stamp = chrono::Utc::now().timestamp();

        let mut attempt = 0u32;
        loop {
            let filename = if attempt == 0 {
                format!("tts_{stamp}.mp3")
            } else {
                format!("tts_{stamp}_{attempt}.mp3")
            };
            let path = self.output_dir.join(&filename);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(audio).await?;
                    file.flush().await?;
                    return Ok((filename, path));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 1000 => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Resolve the speech synthesis capability once at startup.
pub fn resolve(settings: &TtsSettings) -> Capability<SpeechSynthesizer> {
    if !settings.enabled {
        info!("tts disabled in settings");
        return Capability::unavailable("TTS is disabled.");
    }
    match SpeechSynthesizer::new(settings) {
        Ok(synth) => {
            info!(output_dir = %synth.output_dir().display(), "tts available");
            Capability::Available(synth)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to build tts client");
            Capability::unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn synth(server: &MockServer, dir: &Path) -> SpeechSynthesizer {
        SpeechSynthesizer::new(&TtsSettings {
            base_url: format!("{}/translate_tts", server.uri()),
            output_dir: Some(dir.display().to_string()),
            ..TtsSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn voice_language_prefix() {
        assert_eq!(voice_language("ml"), "ml");
        assert_eq!(voice_language("ML-in"), "ml");
        assert_eq!(voice_language("en"), "en");
        assert_eq!(voice_language("hi"), "en");
        assert_eq!(voice_language(""), "en");
    }

    #[test]
    fn split_short_text_single_chunk() {
        assert_eq!(split_chunks("irrigate paddy  fields", 100), vec!["irrigate paddy fields"]);
    }

    #[test]
    fn split_respects_limit() {
        let text = "word ".repeat(60);
        let chunks = split_chunks(&text, 100);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(chunks.join(" "), text.trim_end());
    }

    #[test]
    fn split_hard_splits_long_word() {
        let word = "a".repeat(250);
        let chunks = split_chunks(&format!("x {word} y"), 100);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "x");
        assert_eq!(chunks[1].len(), 100);
        assert_eq!(chunks[3].len(), 50);
        assert_eq!(chunks[4], "y");
    }

    #[test]
    fn split_empty() {
        assert!(split_chunks("   ", 100).is_empty());
    }

    #[test]
    fn split_counts_chars() {
        let text = "നെല്ല് ".repeat(30);
        for chunk in split_chunks(&text, 100) {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[tokio::test]
    async fn synthesize_writes_concatenated_mp3() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("tl", "ml"))
            .and(query_param("client", "tw-ob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let text = "വളം ".repeat(40);
        let out = synth(&server, dir.path()).synthesize(&text, "ml").await.unwrap();

        assert!(out.filename.starts_with("tts_"));
        assert!(std::path::Path::new(&out.filename)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3")));
        let written = std::fs::read(&out.path).unwrap();
        assert_eq!(written, b"ID3ID3");
    }

    #[tokio::test]
    async fn same_second_does_not_overwrite() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let synth = synth(&server, dir.path());
        let a = synth.synthesize("one", "en").await.unwrap();
        let b = synth.synthesize("two", "en").await.unwrap();
        assert_ne!(a.path, b.path);
    }

    #[tokio::test]
    async fn upstream_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = synth(&server, dir.path())
            .synthesize("hello", "en")
            .await
            .unwrap_err();
        assert_matches!(err, LanguageError::Upstream { status: 429, .. });
    }

    #[tokio::test]
    async fn empty_text_is_invalid() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let err = synth(&server, dir.path()).synthesize("  ", "ml").await.unwrap_err();
        assert_matches!(err, LanguageError::InvalidInput(_));
    }

    #[test]
    fn resolve_respects_enabled() {
        assert!(resolve(&TtsSettings::default()).is_available());
        let disabled = TtsSettings {
            enabled: false,
            ..TtsSettings::default()
        };
        assert!(!resolve(&disabled).is_available());
    }
}
