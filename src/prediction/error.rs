use std::time::Duration;

use thiserror::Error;

use crate::generation::GeneratorError;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("model error: {0}")]
    Model(#[from] GeneratorError),

    #[error("model call timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("no usable twist candidates after {attempts} attempt(s)")]
    NoCandidates { attempts: usize },

    #[error("prediction cancelled: receiver dropped")]
    Cancelled,
}

impl PredictionError {
    /// Short machine-readable code for logs and response headers.
    pub fn code(&self) -> &'static str {
        match self {
            PredictionError::InvalidInput { .. } => "invalid_input",
            PredictionError::Model(_) => "model_error",
            PredictionError::Timeout { .. } => "timeout",
            PredictionError::NoCandidates { .. } => "no_candidates",
            PredictionError::Cancelled => "cancelled",
        }
    }
}
