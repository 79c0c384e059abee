//! Sentence embedder (BERT-family safetensors + tokenizer).
//!
//! Use [`SentenceConfig::stub`] for tests and offline runs without model files.

/// Sentence embedder configuration.
pub mod config;
mod stub;

#[cfg(test)]
mod tests;

pub use config::{SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{l2_normalize, load_tokenizer_with_truncation};
use crate::hashing::hash_to_u64;

enum EmbedderBackend {
    Model {
        encoder: BertEncoder,
        tokenizer: Arc<tokenizers::Tokenizer>,
        device: Device,
    },
    Stub {
        device: Device,
    },
}

/// Text-to-vector encoder shared by the index, predictor, scorer and story generator.
///
/// Outputs are L2-normalised, so cosine similarity is a plain dot product.
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: SentenceConfig,
    fingerprint: u64,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub { device } => format!("Stub({:?})", device),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: SentenceConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!(
                embedding_dim = config.embedding_dim,
                "Sentence embedder running in STUB mode (hashed features)"
            );
            return Ok(Self::new_stub(config));
        }

        if !config.model_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_dir.clone(),
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for sentence embedder");

        let mut config = config;
        let (encoder, tokenizer) = Self::load_model(&config, &device)?;

        if encoder.hidden_size() != config.embedding_dim {
            info!(
                configured = config.embedding_dim,
                hidden_size = encoder.hidden_size(),
                "Using model hidden size as embedding dimension"
            );
            config.embedding_dim = encoder.hidden_size();
        }

        let fingerprint = Self::model_fingerprint(&config)?;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            device = device_label(&device),
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
            fingerprint,
        })
    }

    /// Convenience constructor for the hashed-feature backend.
    pub fn stub() -> Self {
        Self::new_stub(SentenceConfig::stub())
    }

    fn new_stub(config: SentenceConfig) -> Self {
        let fingerprint =
            hash_to_u64(format!("stub-blake3-v1:{}", config.embedding_dim).as_bytes());
        Self {
            backend: EmbedderBackend::Stub {
                device: Device::Cpu,
            },
            config,
            fingerprint,
        }
    }

    fn load_model(
        config: &SentenceConfig,
        device: &Device,
    ) -> Result<(BertEncoder, tokenizers::Tokenizer), EmbeddingError> {
        let tokenizer = load_tokenizer_with_truncation(&config.model_dir, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("failed to load tokenizer: {e}"),
            })?;

        let encoder = BertEncoder::load(&config.model_dir, device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("failed to load BERT weights: {e}"),
            }
        })?;

        Ok((encoder, tokenizer))
    }

    fn model_fingerprint(config: &SentenceConfig) -> Result<u64, EmbeddingError> {
        let mut material = std::fs::read(config.config_path())?;
        let weights_len = std::fs::metadata(config.weights_path())?.len();
        material.extend_from_slice(&weights_len.to_le_bytes());
        material.extend_from_slice(&(config.embedding_dim as u64).to_le_bytes());
        material.extend_from_slice(&(config.max_seq_len as u64).to_le_bytes());
        Ok(hash_to_u64(&material))
    }

    /// Generates an embedding for a single string.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => self.embed_with_model(text, encoder, tokenizer, device),
            EmbedderBackend::Stub { .. } => {
                debug!(text_len = text.len(), "Generating stub embedding");
                Ok(stub::hashed_embedding(text, self.config.embedding_dim))
            }
        }
    }

    /// Generates embeddings for a batch of strings.
    ///
    /// Inputs are encoded one at a time, so each row equals [`Self::embed`] on that input.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn embed_with_model(
        &self,
        text: &str,
        encoder: &BertEncoder,
        tokenizer: &tokenizers::Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding = tokenizer.encode(text, true)?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Generating embedding (BERT forward pass)"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = encoder
            .encode(&input_ids, &token_type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("forward pass failed: {e}"),
            })?;

        let mut embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    /// Returns the output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Identifies the backend and weights; persisted snapshots record it.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub { .. })
    }

    /// `"model"` or `"stub"`.
    pub fn mode(&self) -> &'static str {
        if self.is_stub() { "stub" } else { "model" }
    }

    /// Compute device label (`cpu`, `metal` or `cuda`).
    pub fn device(&self) -> &'static str {
        match &self.backend {
            EmbedderBackend::Model { device, .. } | EmbedderBackend::Stub { device } => {
                device_label(device)
            }
        }
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &SentenceConfig {
        &self.config
    }
}
