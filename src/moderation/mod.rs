//! Keyword content moderation for generated and submitted text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::tokenize;

/// Category name and the whole words that trigger it.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("violence", &["kill", "murder", "blood", "death"]),
    ("sexual", &["sexual", "explicit"]),
    ("hate", &["hate", "racist"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Maps the largest per-category hit count to a severity.
    pub fn from_hits(hits: usize) -> Self {
        match hits {
            0 => Self::Safe,
            1 => Self::Mild,
            2..=3 => Self::Moderate,
            _ => Self::Severe,
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, Self::Safe | Self::Mild)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub approved: bool,
    pub flagged_categories: Vec<String>,
    pub severity: Severity,
    pub message: String,
}

/// Stateless category matcher. Cheap to clone and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentModerator;

impl ContentModerator {
    pub fn new() -> Self {
        Self
    }

    pub fn moderate(&self, text: &str) -> ModerationResult {
        let words = tokenize(text);

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for &(category, terms) in CATEGORIES {
            let hits = terms
                .iter()
                .filter(|t| words.iter().any(|w| w == *t))
                .count();
            if hits > 0 {
                counts.insert(category, hits);
            }
        }

        let max_hits = counts.values().copied().max().unwrap_or(0);
        let severity = Severity::from_hits(max_hits);
        let approved = severity.is_approved();
        let flagged_categories: Vec<String> = counts.keys().map(|c| c.to_string()).collect();

        let message = if approved {
            "Content approved".to_string()
        } else {
            format!(
                "Content flagged for: {} ({})",
                flagged_categories.join(", "),
                severity.as_str()
            )
        };

        ModerationResult {
            approved,
            flagged_categories,
            severity,
            message,
        }
    }

    pub fn is_approved(&self, text: &str) -> bool {
        self.moderate(text).approved
    }
}
