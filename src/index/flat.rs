use tracing::debug;

use super::error::{IndexError, IndexResult};
use super::model::{IndexedEntry, RetrievalResult};
use super::similarity::rank_exact;
use super::{IndexKind, VectorIndex, check_query, embed_examples};
use crate::corpus::TwistExample;
use crate::embedding::SentenceEmbedder;

/// Exact brute-force cosine index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    entries: Vec<IndexedEntry>,
    dim: usize,
}

impl FlatIndex {
    /// Embeds every `story_setup` and stores it alongside its example.
    pub fn build(examples: &[TwistExample], embedder: &SentenceEmbedder) -> IndexResult<Self> {
        let entries = embed_examples(examples, embedder)?;
        Self::from_entries(entries, embedder.embedding_dim())
    }

    /// Wraps pre-computed entries (e.g. a loaded snapshot).
    pub fn from_entries(entries: Vec<IndexedEntry>, dim: usize) -> IndexResult<Self> {
        if entries.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dim) {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: bad.vector.len(),
            });
        }
        Ok(Self { entries, dim })
    }
}

impl VectorIndex for FlatIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Flat
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    fn query_filtered(
        &self,
        vector: &[f32],
        k: usize,
        filter: &dyn Fn(&TwistExample) -> bool,
    ) -> IndexResult<RetrievalResult> {
        check_query(vector, k, self.dim)?;

        let positions = (0..self.entries.len()).filter(|&p| filter(&self.entries[p].example));
        let hits = rank_exact(&self.entries, positions, vector, k);

        debug!(k, hits = hits.len(), "Flat index query");
        Ok(hits)
    }
}
