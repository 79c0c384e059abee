//! Vector math shared by the index strategies, predictor and scorer.

use std::cmp::Ordering;

use bitvec::prelude::*;

use super::model::{IndexedEntry, RetrievalHit, RetrievalResult};

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Sign-quantizes a vector into packed bits (1 = positive component).
pub fn quantize_to_binary(vector: &[f32]) -> Vec<u8> {
    let mut bv = BitVec::<u8, Lsb0>::with_capacity(vector.len());
    for &val in vector {
        bv.push(val > 0.0);
    }
    bv.into_vec()
}

pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    if a.len() != b.len() {
        return u32::MAX;
    }

    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x ^ y).count_ones())
        .sum()
}

/// Exact cosine ranking of `positions`, best first, ties broken by position.
pub(crate) fn rank_exact(
    entries: &[IndexedEntry],
    positions: impl Iterator<Item = usize>,
    query: &[f32],
    k: usize,
) -> RetrievalResult {
    let mut scored: Vec<(usize, f32)> = positions
        .map(|p| (p, cosine_similarity(query, &entries[p].vector)))
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(position, score)| RetrievalHit {
            example: entries[position].example.clone(),
            score,
            position,
        })
        .collect()
}
