//! Retrieval-augmented twist prediction.
//!
//! [`RagPredictor`] embeds the setup, retrieves similar corpus examples (soft genre
//! filter), prompts the generator with them as few-shot context, parses ranked
//! candidates and assigns non-increasing confidences. [`RagPredictor::predict_streaming`]
//! runs the same pipeline and reports each step as a [`PredictionEvent`].

mod error;
mod events;
pub mod parse;
pub mod prompt;
mod predictor;
mod types;


pub use error::PredictionError;
pub use events::PredictionEvent;
pub use predictor::{PredictorConfig, RagPredictor};
pub use types::{PredictRequest, Prediction, PredictionCandidate};
