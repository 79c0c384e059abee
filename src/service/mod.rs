//! Process-wide model server state.
//!
//! [`TwistService`] is assembled once from [`Config`] and shared behind `Arc` by the
//! HTTP gateway. It owns the embedder, index, generator and response caches, and
//! bounds concurrent inference with a semaphore.

mod error;


pub use error::ServiceError;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, SemaphorePermit, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::cache::{ResponseCache, TwistStatus};
use crate::config::Config;
use crate::corpus::load_corpus;
use crate::embedding::{EmbeddingError, SentenceConfig, SentenceEmbedder};
use crate::generation::{GenaiGenerator, MockGenerator, TextGenerator};
use crate::hashing::{corpus_fingerprint, request_key};
use crate::index::{IndexKind, IndexSnapshot, VectorIndex, build_index, load_or_build};
use crate::moderation::{ContentModerator, ModerationResult};
use crate::prediction::{
    PredictRequest, Prediction, PredictionError, PredictionEvent, PredictorConfig, RagPredictor,
};
use crate::scoring::{HybridScorer, ScoreBreakdown, ScoreRequest, ScoringError};
use crate::story::{GeneratedStory, GenerationError, StoryGenerator, StoryRequest};

/// Events buffered between the pipeline and a slow SSE client.
const STREAM_BUFFER: usize = 16;

/// Snapshot of what the server is running with, reported by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub device: &'static str,
    pub models_loaded: bool,
    pub embedder_mode: &'static str,
    pub index_kind: IndexKind,
    pub index_size: usize,
    pub generator: String,
}

pub struct TwistService {
    embedder: Arc<SentenceEmbedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn TextGenerator>,
    predictor: RagPredictor,
    scorer: Arc<HybridScorer>,
    stories: StoryGenerator,
    moderator: ContentModerator,
    score_cache: ResponseCache<ScoreBreakdown>,
    prediction_cache: Option<ResponseCache<Prediction>>,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for TwistService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwistService")
            .field("embedder", &self.embedder)
            .field("index", &self.index.kind())
            .field("index_size", &self.index.len())
            .field("generator", &self.generator.name())
            .field("cache_predictions", &self.prediction_cache.is_some())
            .field("permits", &self.permits.available_permits())
            .finish()
    }
}

impl TwistService {
    /// Loads the corpus, embedder and index, and picks the generative provider.
    ///
    /// Blocks while the corpus is embedded; call before serving.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let corpus = load_corpus(&config.corpus_path)?;
        let embedder = Arc::new(SentenceEmbedder::load(SentenceConfig::from_model_dir(
            config.embedder_path.clone(),
        ))?);
        let index = load_or_build(
            config.index_path.as_deref(),
            config.index_kind,
            &embedder,
            &corpus,
        )?;

        let generator: Arc<dyn TextGenerator> = if config.mock_provider {
            warn!("Mock provider enabled, model calls are answered offline");
            Arc::new(MockGenerator::new())
        } else {
            Arc::new(GenaiGenerator::new(config.llm_model.clone()))
        };

        let service = Self::from_parts(config, embedder, index, generator);
        info!(
            corpus = corpus.len(),
            index = %service.index.kind(),
            embedder = service.embedder.mode(),
            generator = service.generator.name(),
            "Twist service ready"
        );
        Ok(service)
    }

    /// Wires pre-built components using the tuning knobs in `config`.
    pub fn from_parts(
        config: &Config,
        embedder: Arc<SentenceEmbedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let moderator = ContentModerator::new();

        let mut predictor = RagPredictor::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
            Arc::clone(&generator),
            PredictorConfig {
                top_k: config.top_k,
                request_timeout: config.request_timeout,
                ..PredictorConfig::default()
            },
        );
        let mut stories = StoryGenerator::new(Arc::clone(&embedder), Arc::clone(&generator))
            .with_timeout(config.request_timeout);
        if config.moderation {
            predictor = predictor.with_moderator(moderator);
            stories = stories.with_moderator(moderator);
        }

        let prediction_cache = config.cache_predictions.then(|| {
            ResponseCache::with_capacity_and_ttl(config.cache_capacity, config.cache_ttl)
        });

        Self {
            scorer: Arc::new(HybridScorer::new(Arc::clone(&embedder))),
            embedder,
            index,
            generator,
            predictor,
            stories,
            moderator,
            score_cache: ResponseCache::with_capacity_and_ttl(
                config.cache_capacity,
                config.cache_ttl,
            ),
            prediction_cache,
            permits: Arc::new(Semaphore::new(config.effective_inference_workers())),
        }
    }

    pub fn embedder(&self) -> &Arc<SentenceEmbedder> {
        &self.embedder
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    #[instrument(skip_all)]
    pub async fn predict(
        &self,
        request: PredictRequest,
    ) -> Result<(Arc<Prediction>, TwistStatus), PredictionError> {
        let request = request.validate()?;
        let key = self
            .prediction_cache
            .as_ref()
            .and_then(|_| cache_key("predict", &request));

        if let (Some(cache), Some(key)) = (&self.prediction_cache, key) {
            if let Some(hit) = cache.get(key) {
                debug!(key, "Prediction cache hit");
                return Ok((hit, TwistStatus::Cached));
            }
        }

        let prediction = {
            let _permit = self.permit().await;
            self.predictor.predict(request).await?
        };

        // Degraded answers are not cached.
        let prediction = match (&self.prediction_cache, key) {
            (Some(cache), Some(key)) if !prediction.degraded_retrieval => {
                cache.insert(key, prediction)
            }
            _ => Arc::new(prediction),
        };
        Ok((prediction, TwistStatus::Fresh))
    }

    /// Runs a prediction in the background and returns its event feed.
    ///
    /// Streams are never cached. Dropping the receiver cancels the pipeline.
    pub fn predict_streaming(
        self: &Arc<Self>,
        request: PredictRequest,
    ) -> mpsc::Receiver<PredictionEvent> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = service.owned_permit().await;
            if let Err(e) = service.predictor.predict_streaming(request, tx).await {
                debug!(error = %e, code = e.code(), "Prediction stream ended without a result");
            }
        });
        rx
    }

    #[instrument(skip_all)]
    pub async fn score(
        &self,
        request: ScoreRequest,
    ) -> Result<(Arc<ScoreBreakdown>, TwistStatus), ScoringError> {
        let request = request.validate()?;
        let key = cache_key("score", &request);

        if let Some(hit) = key.and_then(|key| self.score_cache.get(key)) {
            debug!("Score cache hit");
            return Ok((hit, TwistStatus::Cached));
        }

        let breakdown = {
            let _permit = self.permit().await;
            let scorer = Arc::clone(&self.scorer);
            tokio::task::spawn_blocking(move || {
                scorer.score(
                    &request.guess,
                    &request.actual_twist,
                    request.guess_tags.as_deref(),
                    request.actual_tags.as_deref(),
                )
            })
            .await
            .map_err(EmbeddingError::from)??
        };

        let breakdown = match key {
            Some(key) => self.score_cache.insert(key, breakdown),
            None => Arc::new(breakdown),
        };
        Ok((breakdown, TwistStatus::Fresh))
    }

    /// Generated stories are sampled fresh on every call.
    #[instrument(skip_all)]
    pub async fn generate_story(
        &self,
        request: StoryRequest,
    ) -> Result<GeneratedStory, GenerationError> {
        let _permit = self.permit().await;
        self.stories.generate(request).await
    }

    pub fn moderate(&self, text: &str) -> ModerationResult {
        self.moderator.moderate(text)
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            device: self.embedder.device(),
            models_loaded: true,
            embedder_mode: self.embedder.mode(),
            index_kind: self.index.kind(),
            index_size: self.index.len(),
            generator: self.generator.name().to_string(),
        }
    }

    // The semaphore is never closed, so `None` does not occur in practice.
    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        self.permits.acquire().await.ok()
    }

    async fn owned_permit(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).acquire_owned().await.ok()
    }
}

/// Embeds the configured corpus and writes a fresh snapshot to `TWIST_INDEX_PATH`.
///
/// Returns the number of indexed examples.
pub fn build_index_snapshot(config: &Config) -> Result<usize, ServiceError> {
    let path = config
        .index_path
        .as_deref()
        .ok_or(ServiceError::MissingIndexPath)?;

    let corpus = load_corpus(&config.corpus_path)?;
    let embedder = SentenceEmbedder::load(SentenceConfig::from_model_dir(
        config.embedder_path.clone(),
    ))?;
    let index = build_index(config.index_kind, &corpus, &embedder)?;

    IndexSnapshot::capture(
        index.as_ref(),
        embedder.fingerprint(),
        corpus_fingerprint(&corpus),
    )
    .save(path)?;

    info!(path = %path.display(), entries = index.len(), "Index snapshot written");
    Ok(index.len())
}

fn cache_key<T: Serialize>(namespace: &str, request: &T) -> Option<u64> {
    match request_key(namespace, request) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(namespace, error = %e, "Could not derive cache key");
            None
        }
    }
}
