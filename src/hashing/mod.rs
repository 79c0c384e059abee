//! BLAKE3-based keys and fingerprints.

use blake3::Hasher;
use serde::Serialize;

use crate::corpus::TwistExample;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Collisions only cause a response-cache miss or a spurious index rebuild, never
/// a wrong answer.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    truncate(blake3::hash(data))
}

/// 64-bit BLAKE3 hash over the concatenation of `parts`.
pub fn hash_parts(parts: &[&[u8]]) -> u64 {
    let mut hasher = Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    truncate(hasher.finalize())
}

/// Cache key for a validated request, namespaced per endpoint.
pub fn request_key<T: Serialize>(namespace: &str, request: &T) -> Result<u64, serde_json::Error> {
    let body = serde_json::to_vec(request)?;
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(&body);
    Ok(truncate(hasher.finalize()))
}

/// Order-sensitive fingerprint of a corpus.
///
/// Every field of every example participates, so any edit to the corpus file
/// invalidates a persisted index built from the previous version.
pub fn corpus_fingerprint(examples: &[TwistExample]) -> u64 {
    let mut hasher = Hasher::new();
    for example in examples {
        for field in [
            example.id.as_str(),
            example.genre.as_str(),
            example.story_setup.as_str(),
            example.twist.as_str(),
        ] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(&(example.tags.len() as u64).to_le_bytes());
        for tag in &example.tags {
            hasher.update(&(tag.len() as u64).to_le_bytes());
            hasher.update(tag.as_bytes());
        }
    }
    truncate(hasher.finalize())
}

#[inline]
fn truncate(hash: blake3::Hash) -> u64 {
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}
