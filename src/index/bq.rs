use tracing::debug;

use super::error::{IndexError, IndexResult};
use super::model::{IndexedEntry, RetrievalResult};
use super::similarity::{hamming_distance, quantize_to_binary, rank_exact};
use super::{IndexKind, VectorIndex, check_query, embed_examples};
use crate::corpus::TwistExample;
use crate::embedding::SentenceEmbedder;

/// Shortlist size multiplier over `k`.
pub const DEFAULT_RESCORE_FACTOR: usize = 8;

/// Shortlist floor, so small `k` still sees a useful candidate pool.
pub const DEFAULT_MIN_CANDIDATES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BqParams {
    pub rescore_factor: usize,
    pub min_candidates: usize,
}

impl Default for BqParams {
    fn default() -> Self {
        Self {
            rescore_factor: DEFAULT_RESCORE_FACTOR,
            min_candidates: DEFAULT_MIN_CANDIDATES,
        }
    }
}

impl BqParams {
    pub fn shortlist_len(&self, k: usize) -> usize {
        k.saturating_mul(self.rescore_factor)
            .max(self.min_candidates)
    }
}

/// Approximate index: a Hamming-distance prefilter over 1-bit sign codes, then
/// exact cosine rescoring of the shortlist.
///
/// Returned scores are always exact cosines. The result equals the exact top-K
/// whenever every true top-K entry survives the shortlist; with the default
/// parameters and corpora of up to ~10k entries that is the expected case.
#[derive(Debug, Clone)]
pub struct BqIndex {
    entries: Vec<IndexedEntry>,
    codes: Vec<Vec<u8>>,
    dim: usize,
    params: BqParams,
}

impl BqIndex {
    pub fn build(examples: &[TwistExample], embedder: &SentenceEmbedder) -> IndexResult<Self> {
        let entries = embed_examples(examples, embedder)?;
        Self::from_entries(entries, embedder.embedding_dim())
    }

    pub fn from_entries(entries: Vec<IndexedEntry>, dim: usize) -> IndexResult<Self> {
        Self::with_params(entries, dim, BqParams::default())
    }

    pub fn with_params(
        entries: Vec<IndexedEntry>,
        dim: usize,
        params: BqParams,
    ) -> IndexResult<Self> {
        if entries.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dim) {
            return Err(IndexError::DimensionMismatch {
                expected: dim,
                actual: bad.vector.len(),
            });
        }

        let codes = entries
            .iter()
            .map(|e| quantize_to_binary(&e.vector))
            .collect();

        Ok(Self {
            entries,
            codes,
            dim,
            params,
        })
    }

    pub fn params(&self) -> BqParams {
        self.params
    }
}

impl VectorIndex for BqIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::BinaryQuantized
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

        let query_code = quantize_to_binary(vector);
        let mut shortlist: Vec<(u32, usize)> = self
            .codes
            .iter()
            .enumerate()
            .filter(|(p, _)| filter(&self.entries[*p].example))
            .map(|(p, code)| (hamming_distance(&query_code, code), p))
            .collect();

        let limit = self.params.shortlist_len(k);
        shortlist.sort_unstable();
        shortlist.truncate(limit);

        let candidates = shortlist.len();
        let mut positions: Vec<usize> = shortlist.into_iter().map(|(_, p)| p).collect();
        positions.sort_unstable();

        let hits = rank_exact(&self.entries, positions.into_iter(), vector, k);

        debug!(k, candidates, hits = hits.len(), "BQ index query");
        Ok(hits)
    }
}
