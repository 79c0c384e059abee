use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;
use crate::index::IndexError;

/// Startup failures while assembling a [`super::TwistService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("corpus unavailable: {0}")]
    Corpus(#[from] CorpusError),

    #[error("embedder unavailable: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("index unavailable: {0}")]
    Index(#[from] IndexError),

    #[error("TWIST_INDEX_PATH must be set to build an index snapshot")]
    MissingIndexPath,
}
