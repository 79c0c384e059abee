use thiserror::Error;

/// Failures reported by a [`TextGenerator`](super::TextGenerator).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// The provider call failed (network, auth, model error).
    #[error("model provider error: {message}")]
    Provider { message: String },

    /// The provider answered with no text.
    #[error("model returned an empty response")]
    EmptyResponse,
}
