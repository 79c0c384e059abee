use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::error::GenerationError;
use super::parse::split_sections;
use super::prompt::{story_prompt, strict_story_prompt};
use super::types::{GeneratedStory, StoryRequest};
use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::embedding::{SentenceEmbedder, embed_batch_blocking};
use crate::generation::{GenerationRequest, GeneratorError, TextGenerator};
use crate::index::similarity::cosine_similarity;
use crate::moderation::ContentModerator;

/// A setup and twist this similar are treated as the same text.
const MAX_SECTION_COSINE: f32 = 0.98;

/// Normal prompt, then one strict retry.
const ATTEMPTS: usize = 2;

pub struct StoryGenerator {
    embedder: Arc<SentenceEmbedder>,
    generator: Arc<dyn TextGenerator>,
    moderator: Option<ContentModerator>,
    request_timeout: Duration,
}

impl std::fmt::Debug for StoryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryGenerator")
            .field("generator", &self.generator.name())
            .field("moderation", &self.moderator.is_some())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl StoryGenerator {
    pub fn new(embedder: Arc<SentenceEmbedder>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            embedder,
            generator,
            moderator: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_moderator(mut self, moderator: ContentModerator) -> Self {
        self.moderator = Some(moderator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[instrument(skip_all, fields(genre = ?request.genre, difficulty = ?request.difficulty))]
    pub async fn generate(&self, request: StoryRequest) -> Result<GeneratedStory, GenerationError> {
        let genre = request.resolved_genre();
        let difficulty = request.resolved_difficulty();

        let prompts = [
            story_prompt(&genre, difficulty),
            strict_story_prompt(&genre, difficulty),
        ];

        for (attempt, prompt) in prompts.iter().enumerate().take(ATTEMPTS) {
            let Some(raw) = self.call(prompt).await? else {
                warn!(attempt = attempt + 1, "Model returned no story text");
                continue;
            };

            match self.accept(&raw).await {
                Ok((story_setup, hidden_twist)) => {
                    info!(attempt = attempt + 1, %genre, %difficulty, "Story generated");
                    return Ok(GeneratedStory {
                        story_setup,
                        hidden_twist,
                        genre,
                        difficulty,
                    });
                }
                Err(reason) => {
                    warn!(attempt = attempt + 1, reason, "Rejected story output");
                }
            }
        }

        Err(GenerationError::Unparseable { attempts: ATTEMPTS })
    }

    /// One model call under the timeout. `None` for an empty answer.
    async fn call(&self, prompt: &GenerationRequest) -> Result<Option<String>, GenerationError> {
        match tokio::time::timeout(self.request_timeout, self.generator.generate(prompt)).await {
            Err(_) => Err(GenerationError::Timeout {
                after: self.request_timeout,
            }),
            Ok(Err(GeneratorError::EmptyResponse)) => Ok(None),
            Ok(Err(e)) => Err(GenerationError::Model(e)),
            Ok(Ok(raw)) if raw.trim().is_empty() => Ok(None),
            Ok(Ok(raw)) => Ok(Some(raw)),
        }
    }

    /// Splits and validates one answer, or says why it was rejected.
    async fn accept(&self, raw: &str) -> Result<(String, String), &'static str> {
        let (setup, twist) = split_sections(raw).ok_or("missing SETUP/TWIST headers")?;
        if setup.is_empty() || twist.is_empty() {
            return Err("empty section");
        }
        if setup.to_lowercase() == twist.to_lowercase() {
            return Err("setup and twist are identical");
        }

        match embed_batch_blocking(
            Arc::clone(&self.embedder),
            vec![setup.clone(), twist.clone()],
        )
        .await
        {
            Ok(vectors) => {
                let cosine = cosine_similarity(&vectors[0], &vectors[1]);
                debug!(cosine, "Setup/twist similarity");
                if cosine >= MAX_SECTION_COSINE {
                    return Err("setup and twist are near-duplicates");
                }
            }
            Err(e) => warn!(error = %e, "Could not embed story sections, skipping similarity check"),
        }

        if let Some(moderator) = &self.moderator {
            let combined = format!("{setup} {twist}");
            if !moderator.is_approved(&combined) {
                return Err("rejected by moderation");
            }
        }

        Ok((setup, twist))
    }
}
