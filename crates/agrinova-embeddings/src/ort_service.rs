//! ONNX Runtime embedding service (feature-gated behind `ort`).
//!
//! Downloads a sentence-transformer export (`onnx/model.onnx` plus
//! `tokenizer.json`) via `hf-hub`, tokenizes with `tokenizers`, runs inference
//! via `ort`, then applies attention-masked mean pooling and L2 normalization.
//! The default model is `all-MiniLM-L6-v2` (384 dimensions).

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::normalize::{l2_normalize, mean_pool};
use crate::service::EmbeddingService;

/// Loaded model state. Inference needs `&mut Session`, hence the mutex.
struct OnnxModel {
    session: parking_lot::Mutex<ort::session::Session>,
    tokenizer: tokenizers::Tokenizer,
}

/// ONNX-based sentence embedding service.
pub struct OnnxEmbeddingService {
    config: EmbeddingConfig,
    model: Arc<OnceLock<OnnxModel>>,
}

impl OnnxEmbeddingService {
    /// Create a new ONNX embedding service (not yet initialized).
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            model: Arc::new(OnceLock::new()),
        }
    }

    /// Initialize the service: download model + tokenizer, create ONNX session.
    ///
    /// All blocking work runs on the blocking pool.
    pub async fn initialize(&self) -> Result<()> {
        let config = self.config.clone();
        let model = tokio::task::spawn_blocking(move || load_model(&config))
            .await
            .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))??;

        if self.model.set(model).is_err() {
            debug!("ONNX embedding service already initialized");
        }
        info!(model = %self.config.model, dimensions = self.config.dimensions, "ONNX embedding service ready");
        Ok(())
    }

    /// Get the expected model cache path.
    pub fn model_path(&self) -> PathBuf {
        PathBuf::from(self.config.resolved_cache_dir())
    }
}

fn load_model(config: &EmbeddingConfig) -> Result<OnnxModel> {
    let (model_path, tokenizer_path) = download_model(config)?;
    info!(model = %model_path.display(), "loading ONNX model");

    let mut tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer load: {e}")))?;
    let _ = tokenizer
        .with_truncation(Some(tokenizers::TruncationParams {
            max_length: config.max_sequence_length,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer truncation: {e}")))?;

    let session = ort::session::Session::builder()
        .map_err(|e| EmbeddingError::ModelInit(format!("session builder: {e}")))?
        .with_intra_threads(2)
        .map_err(|e| EmbeddingError::ModelInit(format!("thread config: {e}")))?
        .with_log_level(ort::logging::LogLevel::Warning)
        .map_err(|e| EmbeddingError::ModelInit(format!("log level: {e}")))?
        .commit_from_file(&model_path)
        .map_err(|e| EmbeddingError::ModelInit(format!("model load: {e}")))?;

    Ok(OnnxModel {
        session: parking_lot::Mutex::new(session),
        tokenizer,
    })
}

/// Download model files via `hf-hub`, returning (`model_path`, `tokenizer_path`).
fn download_model(config: &EmbeddingConfig) -> Result<(PathBuf, PathBuf)> {
    let cache_dir = config.resolved_cache_dir();
    debug!(cache_dir, model = %config.model, "fetching model via hf-hub");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(PathBuf::from(&cache_dir))
        .build()
        .map_err(|e| EmbeddingError::ModelInit(format!("hf-hub api: {e}")))?;
    let repo = api.model(config.model.clone());

    let model_path = repo
        .get("onnx/model.onnx")
        .map_err(|e| EmbeddingError::ModelInit(format!("model download: {e}")))?;
    let tokenizer_path = repo
        .get("tokenizer.json")
        .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer download: {e}")))?;

    Ok((model_path, tokenizer_path))
}

/// Run inference on a batch of texts.
fn run_inference(
    session: &mut ort::session::Session,
    tokenizer: &tokenizers::Tokenizer,
    texts: &[String],
    dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| EmbeddingError::Inference(format!("tokenize: {e}")))?;

    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        return Err(EmbeddingError::Inference("empty tokenization".into()));
    }

    let batch_size = texts.len();
    let mut input_ids = vec![0i64; batch_size * max_len];
    let mut attention_mask = vec![0i64; batch_size * max_len];
    let mut token_type_ids = vec![0i64; batch_size * max_len];

    for (i, enc) in encodings.iter().enumerate() {
        let offset = i * max_len;
        for (j, &id) in enc.get_ids().iter().enumerate() {
            input_ids[offset + j] = i64::from(id);
        }
        for (j, &m) in enc.get_attention_mask().iter().enumerate() {
            attention_mask[offset + j] = i64::from(m);
        }
        for (j, &t) in enc.get_type_ids().iter().enumerate() {
            token_type_ids[offset + j] = i64::from(t);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    let shape = vec![batch_size as i64, max_len as i64];
    let input_ids_tensor = ort::value::Tensor::from_array((shape.clone(), input_ids))
        .map_err(|e| EmbeddingError::Inference(format!("input_ids tensor: {e}")))?;
    let attention_mask_tensor =
        ort::value::Tensor::from_array((shape.clone(), attention_mask.clone()))
            .map_err(|e| EmbeddingError::Inference(format!("attention_mask tensor: {e}")))?;
    let token_type_ids_tensor = ort::value::Tensor::from_array((shape, token_type_ids))
        .map_err(|e| EmbeddingError::Inference(format!("token_type_ids tensor: {e}")))?;

    let outputs = session
        .run(ort::inputs![
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor
        ])
        .map_err(|e| EmbeddingError::Inference(format!("inference: {e}")))?;

    // last_hidden_state: [batch_size, seq_len, hidden_dim]
    let (output_shape, output_data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| EmbeddingError::Inference(format!("extract tensor: {e}")))?;

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let dims: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();
    if dims.len() != 3 || dims[0] != batch_size || dims[1] != max_len {
        return Err(EmbeddingError::Inference(format!(
            "unexpected output shape: {output_shape:?}"
        )));
    }
    let hidden_dim = dims[2];
    if hidden_dim != dimensions {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: hidden_dim,
        });
    }

    let item_len = max_len * hidden_dim;
    let results = (0..batch_size)
        .map(|i| {
            let hidden = &output_data[i * item_len..(i + 1) * item_len];
            let mask = &attention_mask[i * max_len..(i + 1) * max_len];
            let mut pooled = mean_pool(hidden, mask, hidden_dim);
            l2_normalize(&mut pooled);
            pooled
        })
        .collect();

    Ok(results)
}

#[async_trait]
impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let dimensions = self.config.dimensions;

        tokio::task::spawn_blocking(move || {
            let model = model.get().ok_or(EmbeddingError::NotReady)?;
            let mut session = model.session.lock();
            run_inference(&mut session, &model.tokenizer, &texts, dimensions)
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))?
    }

    fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    fn is_model_cached(&self) -> bool {
        self.model_path().exists()
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}
