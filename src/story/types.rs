use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GENRE: &str = "mystery";

/// Longest genre label passed through to the prompt.
const MAX_GENRE_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Misdirection guidance included in the prompt.
    pub fn hint(self) -> &'static str {
        match self {
            Difficulty::Easy => {
                "Leave clear clues so an attentive reader can guess the twist."
            }
            Difficulty::Medium => "Plant a few subtle clues and one red herring.",
            Difficulty::Hard => {
                "Misdirect the reader with convincing red herrings. The twist must be \
                 surprising yet fair in hindsight."
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "unknown difficulty '{other}' (expected easy, medium or hard)"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl StoryRequest {
    pub fn new(genre: impl Into<String>) -> Self {
        Self {
            genre: Some(genre.into()),
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Lowercased genre, [`DEFAULT_GENRE`] when absent or blank.
    pub fn resolved_genre(&self) -> String {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(|g| g.chars().take(MAX_GENRE_CHARS).collect::<String>().to_lowercase())
            .unwrap_or_else(|| DEFAULT_GENRE.to_string())
    }

    pub fn resolved_difficulty(&self) -> Difficulty {
        self.difficulty.unwrap_or_default()
    }
}

/// A generated story. `hidden_twist` is a separate field so callers can withhold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedStory {
    pub story_setup: String,
    pub hidden_twist: String,
    pub genre: String,
    pub difficulty: Difficulty,
}
