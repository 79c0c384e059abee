use std::sync::Arc;

use tracing::debug;

use super::error::ScoringError;
use super::justification::justify;
use super::lexical::{lexical_overlap, tag_overlap};
use super::types::{ScoreBreakdown, ScoringWeights, Signal};
use crate::embedding::SentenceEmbedder;
use crate::index::similarity::cosine_similarity;
use crate::text::word_count;

/// Length (in words) at which the length factor of the confidence saturates.
const CONFIDENT_LENGTH: f32 = 20.0;

pub struct HybridScorer {
    embedder: Arc<SentenceEmbedder>,
    weights: ScoringWeights,
}

impl std::fmt::Debug for HybridScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridScorer")
            .field("embedder", &self.embedder.mode())
            .field("weights", &self.weights)
            .finish()
    }
}

impl HybridScorer {
    pub fn new(embedder: Arc<SentenceEmbedder>) -> Self {
        Self::with_weights(embedder, ScoringWeights::DEFAULT)
    }

    pub fn with_weights(embedder: Arc<SentenceEmbedder>, weights: ScoringWeights) -> Self {
        Self { embedder, weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Scores `guess` against `actual`. Runs the embedder inline, so async callers
    /// should move this onto the blocking pool.
    pub fn score(
        &self,
        guess: &str,
        actual: &str,
        tags_guess: Option<&[String]>,
        tags_actual: Option<&[String]>,
    ) -> Result<ScoreBreakdown, ScoringError> {
        if guess.trim().is_empty() {
            return Err(ScoringError::InvalidInput {
                reason: "guess must not be empty".to_string(),
            });
        }
        if actual.trim().is_empty() {
            return Err(ScoringError::InvalidInput {
                reason: "actual twist must not be empty".to_string(),
            });
        }

        let lexical = lexical_overlap(guess, actual);
        let tags = tag_overlap(tags_guess, tags_actual);
        let tag_value = tags.unwrap_or(0.0);
        let guess_length = word_count(guess);
        let actual_length = word_count(actual);

        if guess.trim() == actual.trim() {
            let confidence = confidence(guess_length, actual_length, 1.0);
            return Ok(ScoreBreakdown {
                cosine_similarity: 1.0,
                raw_cosine: 1.0,
                lexical_overlap: 1.0,
                tag_overlap: tag_value,
                final_score: 100.0,
                justification: justify(100.0, Signal::Exact, &lexical.shared, confidence),
                dominant_signal: Signal::Exact,
                shared_tokens: lexical.shared,
                missing_tokens: lexical.missing,
                guess_length,
                actual_length,
                confidence,
            });
        }

        let vectors = self.embedder.embed_batch(&[guess, actual])?;
        let raw_cosine = cosine_similarity(&vectors[0], &vectors[1]);
        let cosine = raw_cosine.clamp(0.0, 1.0);

        let weights = self.weights.effective(tags.is_some());
        let semantic_part = weights.semantic * cosine;
        let lexical_part = weights.lexical * lexical.jaccard;
        let tag_part = weights.tag * tag_value;
        let blend = (semantic_part + lexical_part + tag_part).clamp(0.0, 1.0);
        let final_score = round_to((100.0 * blend.sqrt()).clamp(0.0, 100.0), 2);

        let dominant_signal = if semantic_part >= lexical_part && semantic_part >= tag_part {
            Signal::Semantic
        } else if lexical_part >= tag_part {
            Signal::Lexical
        } else {
            Signal::Tag
        };

        let confidence = confidence(guess_length, actual_length, cosine);

        debug!(
            raw_cosine,
            lexical = lexical.jaccard,
            tag = ?tags,
            final_score,
            dominant = %dominant_signal,
            "Scored guess"
        );

        Ok(ScoreBreakdown {
            cosine_similarity: cosine,
            raw_cosine,
            lexical_overlap: lexical.jaccard,
            tag_overlap: tag_value,
            final_score,
            justification: justify(final_score, dominant_signal, &lexical.shared, confidence),
            dominant_signal,
            shared_tokens: lexical.shared,
            missing_tokens: lexical.missing,
            guess_length,
            actual_length,
            confidence,
        })
    }
}

/// How much to trust a score: short texts and borderline cosines are less certain.
fn confidence(guess_length: usize, actual_length: usize, cosine: f32) -> f32 {
    let length_factor = (guess_length.min(actual_length) as f32 / CONFIDENT_LENGTH).clamp(0.3, 1.0);
    let certainty = (1.0 - (cosine - 0.5).abs() * 2.0).max(0.5);
    round_to((length_factor + certainty) / 2.0, 3)
}

fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod confidence_tests {
    use super::*;

    #[test]
    fn test_confidence_formula() {
        // Short texts: length factor floors at 0.3, certainty peaks at cos 0.5.
        assert_eq!(confidence(4, 5, 0.5), 0.65);
        // Extreme cosine: certainty floors at 0.5.
        assert_eq!(confidence(40, 30, 1.0), 0.75);
        assert_eq!(confidence(10, 12, 0.0), 0.5);
    }
}
