use serde::{Deserialize, Serialize};

use crate::prediction::{PredictRequest, Prediction};
use crate::scoring::{ScoreBreakdown, Signal};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictTwistResponse {
    pub predictions: Vec<String>,
    pub confidence_scores: Vec<f32>,
    pub requested: usize,
    pub retrieved_ids: Vec<String>,
    pub retrieved_snippets: Vec<String>,
    pub degraded_retrieval: bool,
}

impl From<&Prediction> for PredictTwistResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            predictions: prediction.texts(),
            confidence_scores: prediction.confidences(),
            requested: prediction.requested,
            retrieved_ids: prediction.retrieved_ids.clone(),
            retrieved_snippets: prediction.retrieved_snippets.clone(),
            degraded_retrieval: prediction.degraded_retrieval,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityBreakdown {
    pub cosine_similarity: f32,
    /// Same value as the top-level `score`.
    pub semantic_overlap: f32,
    pub lexical_overlap: f32,
    pub tag_overlap: f32,
    pub guess_length: usize,
    pub actual_length: usize,
    pub shared_tokens: Vec<String>,
    pub missing_tokens: Vec<String>,
    pub dominant_signal: Signal,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemanticScoreResponse {
    pub score: f32,
    pub justification: String,
    pub similarity_breakdown: SimilarityBreakdown,
}

impl From<&ScoreBreakdown> for SemanticScoreResponse {
    fn from(b: &ScoreBreakdown) -> Self {
        Self {
            score: b.final_score,
            justification: b.justification.clone(),
            similarity_breakdown: SimilarityBreakdown {
                cosine_similarity: b.cosine_similarity,
                semantic_overlap: b.final_score,
                lexical_overlap: b.lexical_overlap,
                tag_overlap: b.tag_overlap,
                guess_length: b.guess_length,
                actual_length: b.actual_length,
                shared_tokens: b.shared_tokens.clone(),
                missing_tokens: b.missing_tokens.clone(),
                dominant_signal: b.dominant_signal,
                confidence: b.confidence,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerateRequest {
    pub text: String,
}

/// Query string of `GET /stream/predict-twist`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamQuery {
    pub setup: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub num_predictions: Option<usize>,
}

impl From<StreamQuery> for PredictRequest {
    fn from(query: StreamQuery) -> Self {
        let mut request = PredictRequest::new(query.setup);
        if let Some(genre) = query.genre {
            request = request.with_genre(genre);
        }
        if let Some(n) = query.num_predictions {
            request = request.with_num_predictions(n);
        }
        request
    }
}
