use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DimValidationError;
use crate::embedding::EmbeddingError;

/// Errors from building, querying or persisting a vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    #[error("failed to embed example '{id}': {source}")]
    Build {
        id: String,
        #[source]
        source: EmbeddingError,
    },

    #[error("k must be at least 1")]
    InvalidK,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index snapshot is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("index snapshot is stale: {reason}")]
    Stale { reason: String },

    #[error("index I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<DimValidationError> for IndexError {
    fn from(err: DimValidationError) -> Self {
        match err {
            DimValidationError::ZeroDimension => IndexError::Corrupt {
                reason: err.to_string(),
            },
            DimValidationError::DimensionMismatch { expected, actual } => {
                IndexError::DimensionMismatch { expected, actual }
            }
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
