//! Startup wiring: everything handlers need, resolved once before serving.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use agrinova_core::Capability;
use agrinova_embeddings::{EmbeddingConfig, EmbeddingError, EmbeddingService, create_embedding_service};
use agrinova_language::{SpeechSynthesizer, TranscriptionClient, TranslationClient};
use agrinova_language::{transcription, translation, tts};
use agrinova_retrieval::{RetrievalError, Retriever, RetrieverOptions, load_corpus};
use agrinova_settings::{AgriSettings, EmbeddingSettings};
use thiserror::Error;
use tracing::{info, warn};

/// Startup failures. Any of these aborts the process before it listens.
#[derive(Debug, Error)]
pub enum InitError {
    /// The embedding backend could not be brought up.
    #[error("embedding backend: {0}")]
    Embedding(#[from] EmbeddingError),
    /// The corpus was unreadable or the index could not be built.
    #[error("retrieval index: {0}")]
    Retrieval(#[from] RetrievalError),
}

/// Immutable service state shared by all request handlers.
pub struct ServiceContext {
    /// Corpus, index and embedding function.
    pub retriever: Arc<Retriever>,
    /// ASR sidecar.
    pub transcription: Capability<TranscriptionClient>,
    /// Translation sidecar.
    pub translation: Capability<TranslationClient>,
    /// Speech synthesis.
    pub tts: Capability<SpeechSynthesizer>,
}

impl ServiceContext {
    /// Assemble a context from already-resolved parts.
    pub fn new(
        retriever: Arc<Retriever>,
        transcription: Capability<TranscriptionClient>,
        translation: Capability<TranslationClient>,
        tts: Capability<SpeechSynthesizer>,
    ) -> Self {
        Self {
            retriever,
            transcription,
            translation,
            tts,
        }
    }

    /// Bring the service up from settings.
    ///
    /// Order: embedding backend ready, corpus loaded, index built, optional
    /// capabilities resolved.
    pub async fn initialize(settings: &AgriSettings) -> Result<Self, InitError> {
        let embedder = create_embedding_service(&EmbeddingConfig::from_settings(&settings.embedding)).await?;
        let retriever = build_retriever(
            embedder,
            Path::new(&settings.corpus.path),
            &retriever_options(&settings.embedding),
        )
        .await?;

        let (transcription, translation) = tokio::join!(
            transcription::resolve(&settings.transcription),
            translation::resolve(&settings.translation),
        );
        let tts = tts::resolve(&settings.tts);

        let reasons = [
            ("asr", transcription.reason()),
            ("translation", translation.reason()),
            ("tts", tts.reason()),
        ];
        for (capability, reason) in reasons {
            if let Some(reason) = reason {
                warn!(capability, reason, "capability unavailable");
            }
        }
        info!(
            documents = retriever.len(),
            dimensions = retriever.dimensions(),
            asr = transcription.is_available(),
            translation = translation.is_available(),
            tts = tts.is_available(),
            "service context ready"
        );

        Ok(Self::new(Arc::new(retriever), transcription, translation, tts))
    }
}

/// Load the corpus at `path` and index it with `embedder`.
pub async fn build_retriever(
    embedder: Arc<dyn EmbeddingService>,
    path: &Path,
    options: &RetrieverOptions,
) -> Result<Retriever, RetrievalError> {
    let records = load_corpus(path)?;
    Retriever::build(embedder, records, options).await
}

/// Map embedding settings to retriever limits. A zero timeout disables it.
pub fn retriever_options(settings: &EmbeddingSettings) -> RetrieverOptions {
    RetrieverOptions {
        batch_size: settings.batch_size,
        max_concurrency: settings.max_concurrency,
        timeout: (settings.timeout_ms > 0).then(|| Duration::from_millis(settings.timeout_ms)),
    }
}
