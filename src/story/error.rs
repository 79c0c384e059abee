use std::time::Duration;

use thiserror::Error;

use crate::generation::GeneratorError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model error: {0}")]
    Model(#[from] GeneratorError),

    #[error("model call timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("could not split model output into setup and twist after {attempts} attempt(s)")]
    Unparseable { attempts: usize },
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Model(_) => "model_error",
            GenerationError::Timeout { .. } => "timeout",
            GenerationError::Unparseable { .. } => "unparseable",
        }
    }
}
