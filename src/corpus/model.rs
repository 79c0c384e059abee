use serde::{Deserialize, Serialize};

fn unknown_genre() -> String {
    "unknown".to_string()
}

/// One curated story with its twist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwistExample {
    pub id: String,
    #[serde(default = "unknown_genre", alias = "story_genre")]
    pub genre: String,
    pub story_setup: String,
    pub twist: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TwistExample {
    /// Case-insensitive genre comparison.
    pub fn genre_matches(&self, genre: &str) -> bool {
        self.genre.trim().eq_ignore_ascii_case(genre.trim())
    }

    /// Trims fields, drops empty tags and fills a blank genre.
    pub(crate) fn normalize(mut self) -> Self {
        self.id = self.id.trim().to_string();
        self.genre = match self.genre.trim() {
            "" => unknown_genre(),
            g => g.to_string(),
        };
        self.story_setup = self.story_setup.trim().to_string();
        self.twist = self.twist.trim().to_string();
        self.tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }
}
