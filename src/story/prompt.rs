use crate::generation::{GenerationOptions, GenerationRequest, PromptTask};

use super::types::Difficulty;

const SYSTEM: &str = "You are a creative story writer. Generate a story setup and a hidden plot twist.\n\
Format your answer as:\n\
SETUP: [story setup, 2-3 sentences]\n\
TWIST: [hidden plot twist, 1 sentence]";

const STRICT_SYSTEM: &str = "You are a creative story writer. Reply with exactly two lines and nothing else.\n\
The first line starts with \"SETUP:\" followed by the story setup.\n\
The second line starts with \"TWIST:\" followed by a twist that differs from the setup.";

pub fn story_prompt(genre: &str, difficulty: Difficulty) -> GenerationRequest {
    GenerationRequest {
        system: SYSTEM.to_string(),
        user: format!(
            "Generate a {genre} story with a clever plot twist. Difficulty: {difficulty}. {}",
            difficulty.hint()
        ),
        options: GenerationOptions::STORY,
        task: PromptTask::GenerateStory {
            genre: genre.to_string(),
            strict: false,
        },
    }
}

/// Retry prompt after an answer that could not be split.
pub fn strict_story_prompt(genre: &str, difficulty: Difficulty) -> GenerationRequest {
    GenerationRequest {
        system: STRICT_SYSTEM.to_string(),
        user: format!(
            "Genre: {genre}. Difficulty: {difficulty}. {}\nSETUP: ...\nTWIST: ...",
            difficulty.hint()
        ),
        options: GenerationOptions::STORY_STRICT,
        task: PromptTask::GenerateStory {
            genre: genre.to_string(),
            strict: true,
        },
    }
}
