//! Generative model seam.
//!
//! The predictor and story generator only see [`TextGenerator`]. Production uses
//! [`GenaiGenerator`]; offline runs use [`MockGenerator`]; tests script responses
//! with `ScriptedGenerator`.

mod error;
mod provider;
mod mock;

use async_trait::async_trait;

pub use provider::GenaiGenerator;
pub use error::GeneratorError;
pub use mock::MockGenerator;
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedGenerator;

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl GenerationOptions {
    /// Twist prediction sampling.
    pub const PREDICT: Self = Self {
        temperature: 0.8,
        top_p: 0.9,
        max_tokens: 300,
    };

    /// Story generation sampling.
    pub const STORY: Self = Self {
        temperature: 0.9,
        top_p: 0.95,
        max_tokens: 250,
    };

    /// Story retry after an unparseable answer.
    pub const STORY_STRICT: Self = Self {
        temperature: 0.5,
        top_p: 0.9,
        max_tokens: 200,
    };
}

/// What the prompt asks for. Offline generators use it to shape their answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTask {
    PredictTwists { count: usize },
    GenerateStory { genre: String, strict: bool },
}

/// A fully rendered chat prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub options: GenerationOptions,
    pub task: PromptTask,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider/model label for logs and health output.
    fn name(&self) -> &str;

    /// Runs one completion and returns the raw text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}
