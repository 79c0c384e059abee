//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//!
//! # Dimension Invariants
//!
//! The embedding dimension is fixed per embedder. Indexes and snapshots record the
//! dimension they were built with and are checked against the live embedder with
//! [`validate_embedding_dim`] at load time.

/// Output dimension of the default sentence encoder (MiniLM-L6 family).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token budget for a single embedded text.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Default number of retrieved few-shot examples.
pub const DEFAULT_TOP_K: usize = 3;

/// Default number of twist candidates per prediction request.
pub const DEFAULT_NUM_PREDICTIONS: usize = 3;

/// Upper bound applied to `num_predictions`.
pub const MAX_PREDICTIONS: usize = 10;

/// Upper bound on any free-text request field, in characters.
pub const MAX_TEXT_CHARS: usize = 4_000;

/// Default model name handed to the generative provider.
pub const DEFAULT_LLM_MODEL: &str = "llama3.2:1b";

/// Default per-call model timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default response cache capacity (entries).
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_024;

/// Default response cache time-to-live.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use twist::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}
