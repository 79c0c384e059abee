use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::error::PredictionError;
use super::events::{PredictionEvent, candidate_progress};
use super::parse::parse_candidates;
use super::prompt::build_prompt;
use super::types::{PredictRequest, Prediction, PredictionCandidate};
use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_K};
use crate::corpus::TwistExample;
use crate::embedding::{SentenceEmbedder, embed_blocking};
use crate::generation::{GeneratorError, TextGenerator};
use crate::index::similarity::cosine_similarity;
use crate::index::{RetrievalHit, VectorIndex};
use crate::moderation::ContentModerator;
use crate::text::snippet;

/// Characters kept from each retrieved twist in [`Prediction::retrieved_snippets`].
const SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub top_k: usize,
    pub request_timeout: Duration,
    /// Total model calls allowed when the output yields no candidates.
    pub max_attempts: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: 2,
        }
    }
}

struct Retrieval {
    hits: Vec<RetrievalHit>,
    degraded: bool,
}

/// Optional event channel threaded through one pipeline run.
struct Progress<'a> {
    tx: Option<&'a mpsc::Sender<PredictionEvent>>,
}

impl Progress<'_> {
    async fn emit(&self, event: PredictionEvent) -> Result<(), PredictionError> {
        match self.tx {
            Some(tx) => tx.send(event).await.map_err(|_| PredictionError::Cancelled),
            None => Ok(()),
        }
    }

    /// Runs `fut`, abandoning it if the receiver goes away first.
    async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, PredictionError> {
        match self.tx {
            Some(tx) => tokio::select! {
                out = fut => Ok(out),
                _ = tx.closed() => Err(PredictionError::Cancelled),
            },
            None => Ok(fut.await),
        }
    }
}

/// Retrieval-augmented twist predictor.
pub struct RagPredictor {
    embedder: Arc<SentenceEmbedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn TextGenerator>,
    moderator: Option<ContentModerator>,
    config: PredictorConfig,
}

impl std::fmt::Debug for RagPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPredictor")
            .field("index", &self.index.kind())
            .field("index_size", &self.index.len())
            .field("generator", &self.generator.name())
            .field("moderation", &self.moderator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl RagPredictor {
    pub fn new(
        embedder: Arc<SentenceEmbedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn TextGenerator>,
        config: PredictorConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
            moderator: None,
            config,
        }
    }

    /// Drops candidates the moderator rejects.
    pub fn with_moderator(mut self, moderator: ContentModerator) -> Self {
        self.moderator = Some(moderator);
        self
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    #[instrument(skip_all, fields(genre = ?request.genre, n = request.num_predictions))]
    pub async fn predict(&self, request: PredictRequest) -> Result<Prediction, PredictionError> {
        self.run(request, Progress { tx: None }).await
    }

    /// Same pipeline as [`Self::predict`], reporting each step on `tx`.
    ///
    /// Ends with `Complete` or `Failed`. Returns [`PredictionError::Cancelled`] as soon
    /// as the receiver is dropped.
    #[instrument(skip_all, fields(genre = ?request.genre, n = request.num_predictions))]
    pub async fn predict_streaming(
        &self,
        request: PredictRequest,
        tx: mpsc::Sender<PredictionEvent>,
    ) -> Result<Prediction, PredictionError> {
        let progress = Progress { tx: Some(&tx) };
        match self.run(request, progress).await {
            Ok(prediction) => {
                tx.send(PredictionEvent::Complete {
                    prediction: prediction.clone(),
                    progress: 1.0,
                })
                .await
                .map_err(|_| PredictionError::Cancelled)?;
                Ok(prediction)
            }
            Err(PredictionError::Cancelled) => {
                debug!("Prediction stream receiver dropped");
                Err(PredictionError::Cancelled)
            }
            Err(e) => {
                // The receiver may already be gone; the error is returned either way.
                let _ = tx
                    .send(PredictionEvent::Failed {
                        message: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: PredictRequest,
        progress: Progress<'_>,
    ) -> Result<Prediction, PredictionError> {
        progress
            .emit(PredictionEvent::Initializing { progress: 0.0 })
            .await?;
        let request = request.validate()?;
        let count = request.num_predictions;

        progress
            .emit(PredictionEvent::Retrieving { progress: 0.1 })
            .await?;
        let retrieval = progress
            .guard(self.retrieve(&request.story_setup, request.genre.as_deref()))
            .await?;
        progress
            .emit(PredictionEvent::Retrieved {
                count: retrieval.hits.len(),
                degraded: retrieval.degraded,
                progress: 0.2,
            })
            .await?;

        let prompt = build_prompt(
            &request.story_setup,
            request.genre.as_deref(),
            &retrieval.hits,
            count,
        );

        let max_attempts = self.config.max_attempts.max(1);
        let mut texts = Vec::new();
        for attempt in 1..=max_attempts {
            progress
                .emit(PredictionEvent::Generating {
                    attempt,
                    progress: 0.3,
                })
                .await?;

            let call = tokio::time::timeout(
                self.config.request_timeout,
                self.generator.generate(&prompt),
            );
            let raw = match progress.guard(call).await? {
                Err(_) => {
                    warn!(
                        timeout = ?self.config.request_timeout,
                        "Model call timed out"
                    );
                    return Err(PredictionError::Timeout {
                        after: self.config.request_timeout,
                    });
                }
                Ok(Err(GeneratorError::EmptyResponse)) => String::new(),
                Ok(Err(e)) => return Err(PredictionError::Model(e)),
                Ok(Ok(raw)) => raw,
            };

            texts = self.screen(parse_candidates(&raw), count);
            if !texts.is_empty() {
                break;
            }
            warn!(attempt, max_attempts, "Model output had no usable candidates");
        }

        if texts.is_empty() {
            return Err(PredictionError::NoCandidates {
                attempts: max_attempts,
            });
        }

        let groundings = progress
            .guard(self.groundings(&texts, &retrieval))
            .await?;
        let confidences = assign_confidences(&groundings);

        let candidates: Vec<PredictionCandidate> = texts
            .into_iter()
            .zip(confidences)
            .map(|(text, confidence)| PredictionCandidate { text, confidence })
            .collect();

        let total = candidates.len();
        for (index, candidate) in candidates.iter().enumerate() {
            progress
                .emit(PredictionEvent::CandidateReady {
                    index,
                    text: candidate.text.clone(),
                    confidence: candidate.confidence,
                    progress: candidate_progress(index, total),
                })
                .await?;
        }

        info!(
            candidates = total,
            requested = count,
            retrieved = retrieval.hits.len(),
            degraded = retrieval.degraded,
            "Prediction complete"
        );

        Ok(Prediction {
            candidates,
            requested: count,
            retrieved_ids: retrieval
                .hits
                .iter()
                .map(|h| h.example.id.clone())
                .collect(),
            retrieved_snippets: retrieval
                .hits
                .iter()
                .map(|h| snippet(&h.example.twist, SNIPPET_CHARS))
                .collect(),
            degraded_retrieval: retrieval.degraded,
        })
    }

    /// Top-K few-shot examples. Failures degrade to no examples.
    async fn retrieve(&self, setup: &str, genre: Option<&str>) -> Retrieval {
        let degraded = || Retrieval {
            hits: Vec::new(),
            degraded: true,
        };

        let vector = match embed_blocking(Arc::clone(&self.embedder), setup.to_string()).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Setup embedding failed, predicting without examples");
                return degraded();
            }
        };

        let k = self.config.top_k;
        let result = match genre {
            Some(genre) => {
                let filter = |ex: &TwistExample| ex.genre_matches(genre);
                match self.index.query_filtered(&vector, k, &filter) {
                    Ok(hits) if hits.is_empty() => {
                        debug!(genre, "No examples for genre, using unfiltered retrieval");
                        self.index.query(&vector, k)
                    }
                    other => other,
                }
            }
            None => self.index.query(&vector, k),
        };

        match result {
            Ok(hits) => Retrieval {
                hits,
                degraded: false,
            },
            Err(e) => {
                warn!(error = %e, "Index query failed, predicting without examples");
                degraded()
            }
        }
    }

    fn screen(&self, candidates: Vec<String>, count: usize) -> Vec<String> {
        let mut kept = Vec::with_capacity(count);
        for candidate in candidates {
            if kept.len() == count {
                break;
            }
            if let Some(moderator) = &self.moderator {
                let verdict = moderator.moderate(&candidate);
                if !verdict.approved {
                    warn!(
                        categories = ?verdict.flagged_categories,
                        severity = verdict.severity.as_str(),
                        "Dropping moderated candidate"
                    );
                    continue;
                }
            }
            kept.push(candidate);
        }
        kept
    }

    /// Max clamped cosine between each candidate and the retrieved twists.
    ///
    /// 1.0 when there is nothing to compare against or the candidate cannot be embedded.
    async fn groundings(&self, texts: &[String], retrieval: &Retrieval) -> Vec<f32> {
        if retrieval.degraded || retrieval.hits.is_empty() {
            return vec![1.0; texts.len()];
        }

        let embedder = Arc::clone(&self.embedder);
        let candidates = texts.to_vec();
        let twists: Vec<String> = retrieval
            .hits
            .iter()
            .map(|h| h.example.twist.clone())
            .collect();

        let computed = tokio::task::spawn_blocking(move || {
            let twist_vectors: Vec<Vec<f32>> = twists
                .iter()
                .filter_map(|t| embedder.embed(t).ok())
                .collect();

            candidates
                .iter()
                .map(|c| match embedder.embed(c) {
                    Ok(v) if !twist_vectors.is_empty() => twist_vectors
                        .iter()
                        .map(|t| cosine_similarity(&v, t).clamp(0.0, 1.0))
                        .fold(0.0f32, f32::max),
                    _ => 1.0,
                })
                .collect::<Vec<f32>>()
        })
        .await;

        match computed {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Grounding task failed");
                vec![1.0; texts.len()]
            }
        }
    }
}

/// Rank decay weighted by grounding, made non-increasing by a running minimum and
/// rounded to 3 decimals.
pub(crate) fn assign_confidences(groundings: &[f32]) -> Vec<f32> {
    let mut floor = f32::INFINITY;
    groundings
        .iter()
        .enumerate()
        .map(|(i, grounding)| {
            let decay = (1.0 - 0.1 * i as f32).max(0.1);
            let raw = decay * (0.75 + 0.25 * grounding.clamp(0.0, 1.0));
            floor = floor.min(raw);
            (floor * 1000.0).round() / 1000.0
        })
        .collect()
}
