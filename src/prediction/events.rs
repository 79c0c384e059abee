//! Progress events emitted by [`RagPredictor::predict_streaming`](super::RagPredictor::predict_streaming).

use serde::Serialize;

use super::types::Prediction;

/// One step of a streamed prediction. Serialized with a `status` tag so SSE
/// clients can switch on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionEvent {
    Initializing {
        progress: f32,
    },
    Retrieving {
        progress: f32,
    },
    Retrieved {
        count: usize,
        degraded: bool,
        progress: f32,
    },
    Generating {
        attempt: usize,
        progress: f32,
    },
    CandidateReady {
        index: usize,
        text: String,
        confidence: f32,
        progress: f32,
    },
    Complete {
        prediction: Prediction,
        progress: f32,
    },
    Failed {
        message: String,
    },
}

impl PredictionEvent {
    /// SSE event name; matches the serialized `status` tag.
    pub fn name(&self) -> &'static str {
        match self {
            PredictionEvent::Initializing { .. } => "initializing",
            PredictionEvent::Retrieving { .. } => "retrieving",
            PredictionEvent::Retrieved { .. } => "retrieved",
            PredictionEvent::Generating { .. } => "generating",
            PredictionEvent::CandidateReady { .. } => "candidate_ready",
            PredictionEvent::Complete { .. } => "complete",
            PredictionEvent::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionEvent::Complete { .. } | PredictionEvent::Failed { .. }
        )
    }
}

/// Progress reported for candidate `index` of `total`, spread over `0.4..=0.9`.
pub(crate) fn candidate_progress(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.9;
    }
    0.4 + 0.5 * (index + 1) as f32 / total as f32
}
