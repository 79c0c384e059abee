use async_trait::async_trait;

use super::{GenerationRequest, GeneratorError, PromptTask, TextGenerator};
use crate::hashing::hash_to_u64;

const TWIST_TEMPLATES: &[&str] = &[
    "The narrator has been lying to the reader from the very first page.",
    "The helpful companion is secretly orchestrating every misfortune.",
    "The protagonist has been a ghost all along and is the one haunting the others.",
    "Everything takes place inside a simulation designed to test the hero.",
    "The villain is the hero's future self trying to prevent a worse outcome.",
    "The missing person never existed and was invented to hide a secret.",
    "The two rival families turn out to be the same family split across time.",
    "The mentor staged the original tragedy to recruit the hero.",
    "The whole town is a stage set and every resident is a paid actor.",
    "The hero's memories were implanted and belong to someone else.",
];

struct StoryTemplate {
    genre: &'static str,
    setup: &'static str,
    twist: &'static str,
}

const STORY_TEMPLATES: &[StoryTemplate] = &[
    StoryTemplate {
        genre: "mystery",
        setup: "A famous painting vanishes from a locked gallery during a storm, and the night guard swears nobody entered.",
        twist: "The painting was never stolen; the curator replaced it with a forgery years ago and staged the theft to hide it.",
    },
    StoryTemplate {
        genre: "horror",
        setup: "A family moves into a quiet farmhouse and hears footsteps in the attic every night at three.",
        twist: "The family are the spirits, and the footsteps belong to the living owners who are terrified of them.",
    },
    StoryTemplate {
        genre: "sci-fi",
        setup: "The crew of a deep space freighter wakes from cryosleep to find the ship drifting far off course.",
        twist: "The freighter never left orbit; the crew are test subjects in a simulation run by the company.",
    },
    StoryTemplate {
        genre: "thriller",
        setup: "A journalist receives anonymous tips that lead her straight to a corrupt senator.",
        twist: "The anonymous source is the senator himself, using her to take down his own rivals.",
    },
    StoryTemplate {
        genre: "fantasy",
        setup: "A young squire is chosen by an ancient sword to defeat the dragon terrorizing the kingdom.",
        twist: "The dragon is the true guardian of the kingdom, and the sword was forged by the tyrant king.",
    },
    StoryTemplate {
        genre: "romance",
        setup: "Two rival bakers compete for the same storefront on a small town main street.",
        twist: "They have been secret pen pals for years without knowing each other's real names.",
    },
];

/// Deterministic offline provider.
///
/// Answers in the formats the prompts request, picking templates by a hash of the
/// prompt so equal requests get equal answers.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    fn predict(&self, request: &GenerationRequest, count: usize) -> String {
        let templates = TWIST_TEMPLATES.len();
        let seed = (hash_to_u64(request.user.as_bytes()) % templates as u64) as usize;
        (0..count)
            .map(|i| {
                let template = TWIST_TEMPLATES[(seed + i) % templates];
                format!("{}. {}", i + 1, template)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn story(&self, genre: &str, strict: bool) -> String {
        let wanted = genre.trim().to_ascii_lowercase();
        let (setup, twist) = match STORY_TEMPLATES
            .iter()
            .find(|t| wanted.contains(t.genre) || t.genre.contains(wanted.as_str()))
        {
            Some(t) if !wanted.is_empty() => (t.setup.to_string(), t.twist.to_string()),
            _ => (
                format!(
                    "In a {genre} tale, a stranger arrives in town claiming to be the heir of a forgotten estate."
                ),
                "The stranger is telling the truth, and the family who welcomed him are the impostors."
                    .to_string(),
            ),
        };

        if strict {
            format!("SETUP: {setup}\nTWIST: {twist}")
        } else {
            format!("Here is your story.\n\n**SETUP:** {setup}\n\n**TWIST:** {twist}")
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        Ok(match &request.task {
            PromptTask::PredictTwists { count } => self.predict(request, *count),
            PromptTask::GenerateStory { genre, strict } => self.story(genre, *strict),
        })
    }
}

#[cfg(any(test, feature = "mock"))]
mod scripted {
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::super::{GenerationRequest, GeneratorError, TextGenerator};

    /// Test double that replays queued responses in order and records every request.
    #[derive(Debug, Default)]
    pub struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedGenerator {
        pub fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::from_results(responses.into_iter().map(|s| Ok(s.into())))
        }

        pub fn from_results<I>(results: I) -> Self
        where
            I: IntoIterator<Item = Result<String, GeneratorError>>,
        {
            Self {
                responses: Mutex::new(results.into_iter().collect()),
                ..Default::default()
            }
        }

        /// Sleeps before answering (for timeout and cancellation tests).
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn push(&self, response: Result<String, GeneratorError>) {
            self.responses.lock().push_back(response);
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
            self.requests.lock().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or(Err(GeneratorError::Provider {
                    message: "script exhausted".to_string(),
                }))
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedGenerator;
