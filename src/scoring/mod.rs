//! Hybrid guess scoring.
//!
//! A guess is compared with the actual twist on three signals:
//!
//! - semantic cosine between the two sentence embeddings;
//! - lexical Jaccard overlap of content tokens;
//! - tag Jaccard overlap, when both sides carry tags.
//!
//! The weighted blend is square-root calibrated onto 0..=100 and explained by a
//! banded [justification](justification).

pub mod error;
pub mod justification;
pub mod lexical;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::HybridScorer;
pub use types::{ScoreBand, ScoreBreakdown, ScoreRequest, ScoringWeights, Signal};
