//! Nearest-neighbour retrieval over the embedded corpus.
//!
//! Two strategies share the [`VectorIndex`] contract: [`FlatIndex`] (exact) and
//! [`BqIndex`] (binary-quantized prefilter + exact rescoring). Both return hits
//! sorted by descending cosine with ties kept in insertion order.

pub mod bq;
mod error;
pub mod flat;
mod model;
pub mod persist;
pub mod similarity;


use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

pub use bq::{BqIndex, BqParams};
pub use error::{IndexError, IndexResult};
pub use flat::FlatIndex;
pub use model::{IndexedEntry, RetrievalHit, RetrievalResult};
pub use persist::{IndexSnapshot, SNAPSHOT_FORMAT_VERSION, load_or_build};

use crate::corpus::TwistExample;
use crate::embedding::SentenceEmbedder;

/// Which nearest-neighbour strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Flat,
    #[serde(rename = "bq")]
    BinaryQuantized,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Flat => f.write_str("flat"),
            IndexKind::BinaryQuantized => f.write_str("bq"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "exact" => Ok(IndexKind::Flat),
            "bq" | "binary" => Ok(IndexKind::BinaryQuantized),
            other => Err(format!("unknown index kind '{other}' (expected flat or bq)")),
        }
    }
}

/// Read-only top-K similarity search over corpus examples.
pub trait VectorIndex: Send + Sync + fmt::Debug {
    fn kind(&self) -> IndexKind;

    /// Embedding dimension every query must match.
    fn dim(&self) -> usize;

    /// All entries in insertion order.
    fn entries(&self) -> &[IndexedEntry];

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Top-`k` among entries accepted by `filter`.
    ///
    /// `k` larger than the candidate set returns every candidate.
    fn query_filtered(
        &self,
        vector: &[f32],
        k: usize,
        filter: &dyn Fn(&TwistExample) -> bool,
    ) -> IndexResult<RetrievalResult>;

    fn query(&self, vector: &[f32], k: usize) -> IndexResult<RetrievalResult> {
        self.query_filtered(vector, k, &|_: &TwistExample| true)
    }
}

/// Wraps pre-computed entries in the requested strategy.
pub fn index_from_entries(
    kind: IndexKind,
    entries: Vec<IndexedEntry>,
    dim: usize,
) -> IndexResult<Arc<dyn VectorIndex>> {
    Ok(match kind {
        IndexKind::Flat => Arc::new(FlatIndex::from_entries(entries, dim)?),
        IndexKind::BinaryQuantized => Arc::new(BqIndex::from_entries(entries, dim)?),
    })
}

/// Embeds the corpus and builds the requested strategy.
pub fn build_index(
    kind: IndexKind,
    examples: &[TwistExample],
    embedder: &SentenceEmbedder,
) -> IndexResult<Arc<dyn VectorIndex>> {
    let entries = embed_examples(examples, embedder)?;
    let index = index_from_entries(kind, entries, embedder.embedding_dim())?;
    info!(%kind, entries = index.len(), dim = index.dim(), "Vector index built");
    Ok(index)
}

pub(crate) fn embed_examples(
    examples: &[TwistExample],
    embedder: &SentenceEmbedder,
) -> IndexResult<Vec<IndexedEntry>> {
    if examples.is_empty() {
        return Err(IndexError::EmptyCorpus);
    }

    examples
        .iter()
        .map(|example| {
            let vector =
                embedder
                    .embed(&example.story_setup)
                    .map_err(|source| IndexError::Build {
                        id: example.id.clone(),
                        source,
                    })?;
            Ok(IndexedEntry {
                example: example.clone(),
                vector,
            })
        })
        .collect()
}

pub(crate) fn check_query(vector: &[f32], k: usize, dim: usize) -> IndexResult<()> {
    if k == 0 {
        return Err(IndexError::InvalidK);
    }
    if vector.len() != dim {
        return Err(IndexError::DimensionMismatch {
            expected: dim,
            actual: vector.len(),
        });
    }
    Ok(())
}
