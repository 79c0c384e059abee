use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ScoringError;
use crate::constants::MAX_TEXT_CHARS;

/// Relative weight of each signal in the blended score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub semantic: f32,
    pub lexical: f32,
    pub tag: f32,
}

impl ScoringWeights {
    pub const DEFAULT: Self = Self {
        semantic: 0.70,
        lexical: 0.20,
        tag: 0.10,
    };

    /// Weights actually applied for one comparison.
    ///
    /// Without a tag signal the semantic and lexical weights are rescaled to sum to 1.
    pub fn effective(&self, tags_available: bool) -> Self {
        if tags_available {
            return *self;
        }
        let total = self.semantic + self.lexical;
        if total <= 0.0 {
            return Self {
                semantic: 0.0,
                lexical: 0.0,
                tag: 0.0,
            };
        }
        Self {
            semantic: self.semantic / total,
            lexical: self.lexical / total,
            tag: 0.0,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The signal that contributed most to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Semantic,
    Lexical,
    Tag,
    Exact,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Semantic => "semantic",
            Signal::Lexical => "lexical",
            Signal::Tag => "tag",
            Signal::Exact => "exact",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Strong,
    Partial,
    Weak,
    Miss,
}

impl ScoreBand {
    pub fn from_score(score: f32) -> Self {
        if score >= 85.0 {
            ScoreBand::Excellent
        } else if score >= 70.0 {
            ScoreBand::Strong
        } else if score >= 40.0 {
            ScoreBand::Partial
        } else if score >= 20.0 {
            ScoreBand::Weak
        } else {
            ScoreBand::Miss
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent match!",
            ScoreBand::Strong => "Very close guess, a strong match.",
            ScoreBand::Partial => "Partial match.",
            ScoreBand::Weak => "Weak match.",
            ScoreBand::Miss => "Quite different from the actual twist.",
        }
    }
}

/// Full result of scoring one guess against the actual twist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Cosine clamped to `[0, 1]`.
    pub cosine_similarity: f32,
    /// Unclamped cosine, may be negative.
    pub raw_cosine: f32,
    pub lexical_overlap: f32,
    pub tag_overlap: f32,
    /// Calibrated score in `[0, 100]`.
    pub final_score: f32,
    pub justification: String,
    pub dominant_signal: Signal,
    pub shared_tokens: Vec<String>,
    /// Tokens of the actual twist absent from the guess.
    pub missing_tokens: Vec<String>,
    pub guess_length: usize,
    pub actual_length: usize,
    pub confidence: f32,
}

impl ScoreBreakdown {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.final_score)
    }
}

/// A guess to score, as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub guess: String,
    pub actual_twist: String,
    #[serde(default)]
    pub guess_tags: Option<Vec<String>>,
    #[serde(default)]
    pub actual_tags: Option<Vec<String>>,
}

impl ScoreRequest {
    pub fn new(guess: impl Into<String>, actual_twist: impl Into<String>) -> Self {
        Self {
            guess: guess.into(),
            actual_twist: actual_twist.into(),
            guess_tags: None,
            actual_tags: None,
        }
    }

    pub fn with_tags(mut self, guess_tags: Vec<String>, actual_tags: Vec<String>) -> Self {
        self.guess_tags = Some(guess_tags);
        self.actual_tags = Some(actual_tags);
        self
    }

    /// Trimmed copy; rejects blank or oversized text.
    pub fn validate(self) -> Result<Self, ScoringError> {
        let guess = checked_text("guess", &self.guess)?;
        let actual_twist = checked_text("actual_twist", &self.actual_twist)?;
        Ok(Self {
            guess,
            actual_twist,
            ..self
        })
    }
}

fn checked_text(field: &str, text: &str) -> Result<String, ScoringError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScoringError::InvalidInput {
            reason: format!("{field} must not be empty"),
        });
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ScoringError::InvalidInput {
            reason: format!("{field} exceeds {MAX_TEXT_CHARS} characters"),
        });
    }
    Ok(text.to_string())
}
