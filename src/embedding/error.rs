use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the sentence embedder or embedding text.
///
/// Everything except [`EmbeddingError::EmptyInput`] is an internal fault from the
/// caller's point of view.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("text to embed is empty or whitespace")]
    EmptyInput,

    #[error("sentence model directory not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load sentence model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("sentence embedding failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EmbeddingError {
    /// True when the caller supplied unusable text rather than the model failing.
    pub fn is_input_error(&self) -> bool {
        matches!(self, EmbeddingError::EmptyInput)
    }
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<tokenizers::Error> for EmbeddingError {
    fn from(err: tokenizers::Error) -> Self {
        EmbeddingError::TokenizationFailed {
            reason: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for EmbeddingError {
    fn from(err: tokio::task::JoinError) -> Self {
        EmbeddingError::InferenceFailed {
            reason: format!("embedding task failed: {err}"),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
