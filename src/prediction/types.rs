use serde::{Deserialize, Serialize};

use super::error::PredictionError;
use crate::constants::{DEFAULT_NUM_PREDICTIONS, MAX_PREDICTIONS, MAX_TEXT_CHARS};

fn default_num_predictions() -> usize {
    DEFAULT_NUM_PREDICTIONS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub story_setup: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default = "default_num_predictions")]
    pub num_predictions: usize,
}

impl PredictRequest {
    pub fn new(story_setup: impl Into<String>) -> Self {
        Self {
            story_setup: story_setup.into(),
            genre: None,
            num_predictions: DEFAULT_NUM_PREDICTIONS,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_num_predictions(mut self, n: usize) -> Self {
        self.num_predictions = n;
        self
    }

    /// Normalised copy: trimmed setup, blank genre dropped, count clamped to
    /// `1..=MAX_PREDICTIONS`.
    pub fn validate(self) -> Result<Self, PredictionError> {
        let story_setup = self.story_setup.trim().to_string();
        if story_setup.is_empty() {
            return Err(PredictionError::InvalidInput {
                reason: "story_setup must not be empty".to_string(),
            });
        }
        if story_setup.chars().count() > MAX_TEXT_CHARS {
            return Err(PredictionError::InvalidInput {
                reason: format!("story_setup exceeds {MAX_TEXT_CHARS} characters"),
            });
        }

        let genre = self
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());

        Ok(Self {
            story_setup,
            genre,
            num_predictions: self.num_predictions.clamp(1, MAX_PREDICTIONS),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionCandidate {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Ranked candidates, confidences non-increasing.
    pub candidates: Vec<PredictionCandidate>,
    /// Count asked for after clamping. May exceed `candidates.len()`.
    pub requested: usize,
    pub retrieved_ids: Vec<String>,
    pub retrieved_snippets: Vec<String>,
    pub degraded_retrieval: bool,
}

impl Prediction {
    pub fn texts(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.text.clone()).collect()
    }

    pub fn confidences(&self) -> Vec<f32> {
        self.candidates.iter().map(|c| c.confidence).collect()
    }
}
