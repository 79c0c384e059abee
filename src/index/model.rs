use serde::Serialize;

use crate::corpus::TwistExample;

/// A corpus example stored next to its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub example: TwistExample,
    pub vector: Vec<f32>,
}

/// One nearest-neighbour match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    pub example: TwistExample,
    /// Cosine similarity to the query.
    pub score: f32,
    /// Insertion position in the index (tie-break key).
    pub position: usize,
}

/// Top-K matches, best first.
pub type RetrievalResult = Vec<RetrievalHit>;
