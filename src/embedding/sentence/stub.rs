//! Hashed-feature embedding used when no model is configured.
//!
//! Each word contributes to one signed bucket, and each of its padded character
//! trigrams (`<word>`) contributes at half the word's weight. Stop words are
//! down-weighted so that paraphrases sharing content words land close together.

use crate::embedding::utils::l2_normalize;
use crate::hashing::hash_parts;
use crate::text::{is_stop_word, tokenize};

const WORD_WEIGHT: f32 = 1.0;
const STOP_WORD_WEIGHT: f32 = 0.25;
const TRIGRAM_SCALE: f32 = 0.5;

pub(super) fn hashed_embedding(text: &str, dim: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dim];

    for word in tokenize(text) {
        let weight = if is_stop_word(&word) {
            STOP_WORD_WEIGHT
        } else {
            WORD_WEIGHT
        };
        add_feature(&mut v, hash_parts(&[b"w:", word.as_bytes()]), weight);

        let padded: Vec<char> = format!("<{word}>").chars().collect();
        let mut buf = [0u8; 16];
        for tri in padded.windows(3) {
            let mut len = 0;
            for c in tri {
                len += c.encode_utf8(&mut buf[len..]).len();
            }
            add_feature(
                &mut v,
                hash_parts(&[b"c:", &buf[..len]]),
                weight * TRIGRAM_SCALE,
            );
        }
    }

    l2_normalize(&mut v);
    v
}

#[inline]
fn add_feature(v: &mut [f32], hash: u64, weight: f32) {
    let bucket = (hash % v.len() as u64) as usize;
    if hash >> 63 == 0 {
        v[bucket] += weight;
    } else {
        v[bucket] -= weight;
    }
}
