//! Twist Arena library crate (used by the server binary, benches and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`TwistService`] - Process-wide state behind the HTTP gateway
//! - [`TwistExample`] - Curated corpus entries
//!
//! ## Pipelines
//! - [`RagPredictor`] - Retrieval-augmented twist prediction (plain and streaming)
//! - [`HybridScorer`] - Semantic + lexical + tag guess scoring
//! - [`StoryGenerator`] - Setup/twist story generation
//! - [`ContentModerator`] - Keyword moderation of generated text
//!
//! ## Retrieval
//! - [`SentenceEmbedder`], [`SentenceConfig`] - Embedding generation
//! - [`VectorIndex`], [`FlatIndex`], [`BqIndex`] - Top-K search over the corpus
//! - [`IndexSnapshot`] - rkyv-persisted index
//!
//! ## Test/Mock Support
//! Scripted generators are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod gateway;
pub mod generation;
pub mod hashing;
pub mod index;
pub mod moderation;
pub mod prediction;
pub mod scoring;
pub mod service;
pub mod story;
pub mod text;

pub use cache::{ResponseCache, TWIST_STATUS_HEADER, TwistStatus};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{CorpusError, TwistExample, load_corpus};
pub use embedding::{EmbeddingError, SentenceConfig, SentenceEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use generation::ScriptedGenerator;
pub use generation::{GenaiGenerator, GeneratorError, MockGenerator, TextGenerator};
pub use hashing::{corpus_fingerprint, hash_parts, hash_to_u64, request_key};
pub use index::{
    BqIndex, FlatIndex, IndexError, IndexKind, IndexSnapshot, RetrievalHit, VectorIndex,
    load_or_build,
};
pub use moderation::{ContentModerator, ModerationResult, Severity};
pub use prediction::{
    PredictRequest, Prediction, PredictionCandidate, PredictionError, PredictionEvent,
    PredictorConfig, RagPredictor,
};
pub use scoring::{HybridScorer, ScoreBreakdown, ScoreRequest, ScoringError, Signal};
pub use service::{ServiceError, TwistService};
pub use story::{Difficulty, GeneratedStory, GenerationError, StoryGenerator, StoryRequest};
