//! Sentence embeddings.
//!
//! - [`sentence`] turns text into L2-normalised vectors (BERT or hashed-feature stub).
//! - [`embed_blocking`] runs an embedding on tokio's blocking pool.

/// BERT encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Sentence embedder.
pub mod sentence;
/// Tokenizer loading and vector helpers.
pub mod utils;

use std::sync::Arc;

pub use error::EmbeddingError;
pub use sentence::{SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder};

/// Embeds `text` without blocking the async runtime.
pub async fn embed_blocking(
    embedder: Arc<SentenceEmbedder>,
    text: String,
) -> Result<Vec<f32>, EmbeddingError> {
    tokio::task::spawn_blocking(move || embedder.embed(&text)).await?
}

/// Batch variant of [`embed_blocking`].
pub async fn embed_batch_blocking(
    embedder: Arc<SentenceEmbedder>,
    texts: Vec<String>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    tokio::task::spawn_blocking(move || {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        embedder.embed_batch(&refs)
    })
    .await?
}
