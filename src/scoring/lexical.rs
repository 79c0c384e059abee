//! Token and tag overlap.

use std::collections::BTreeSet;

use crate::text::{content_tokens, tokenize};

/// Diagnostics lists are capped at this many tokens.
pub const MAX_LISTED_TOKENS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalOverlap {
    pub jaccard: f32,
    pub shared: Vec<String>,
    pub missing: Vec<String>,
}

/// Token set used for lexical comparison of `text`.
///
/// Content tokens normally; all tokens when `fallback` is set.
fn token_set(text: &str, fallback: bool) -> BTreeSet<String> {
    if fallback {
        tokenize(text).into_iter().collect()
    } else {
        content_tokens(text)
    }
}

/// Jaccard overlap of the content tokens of `guess` and `actual`.
///
/// Falls back to all tokens when either side has no content tokens (for example a
/// guess made only of stop words).
pub fn lexical_overlap(guess: &str, actual: &str) -> LexicalOverlap {
    let mut g = content_tokens(guess);
    let mut a = content_tokens(actual);
    if g.is_empty() || a.is_empty() {
        g = token_set(guess, true);
        a = token_set(actual, true);
    }

    let shared: Vec<String> = g.intersection(&a).cloned().collect();
    let union = g.union(&a).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        shared.len() as f32 / union as f32
    };

    let missing = a
        .difference(&g)
        .take(MAX_LISTED_TOKENS)
        .cloned()
        .collect();

    LexicalOverlap {
        jaccard,
        shared: shared.into_iter().take(MAX_LISTED_TOKENS).collect(),
        missing,
    }
}

fn normalize_tags(tags: Option<&[String]>) -> BTreeSet<String> {
    tags.unwrap_or_default()
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard overlap of two tag lists, or `None` when either side has no tags.
pub fn tag_overlap(guess: Option<&[String]>, actual: Option<&[String]>) -> Option<f32> {
    let g = normalize_tags(guess);
    let a = normalize_tags(actual);
    if g.is_empty() || a.is_empty() {
        return None;
    }
    let shared = g.intersection(&a).count();
    let union = g.union(&a).count();
    Some(shared as f32 / union as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lexical_overlap_content_tokens() {
        let o = lexical_overlap("The butler did it", "The butler committed the murder");
        assert!((o.jaccard - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(o.shared, vec!["butler"]);
        assert_eq!(o.missing, vec!["committed", "murder"]);
    }

    #[test]
    fn test_lexical_overlap_stop_word_fallback() {
        let o = lexical_overlap("it was him", "it was them");
        // "him"/"them" are not stop words, so content sets are non-empty.
        assert_eq!(o.jaccard, 0.0);

        let o = lexical_overlap("it was", "it was not");
        assert!((o.jaccard - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_overlap_caps_lists() {
        let actual = (0..20).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let o = lexical_overlap("nothing", &actual);
        assert_eq!(o.missing.len(), MAX_LISTED_TOKENS);
    }

    #[test]
    fn test_tag_overlap() {
        let g = tags(&["Horror", " ghost "]);
        let a = tags(&["ghost", "twist"]);
        let v = tag_overlap(Some(&g), Some(&a)).unwrap();
        assert!((v - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_tag_overlap_unavailable() {
        let a = tags(&["ghost"]);
        assert_eq!(tag_overlap(None, Some(&a)), None);
        assert_eq!(tag_overlap(Some(&[]), Some(&a)), None);
        assert_eq!(tag_overlap(Some(&tags(&["  "])), Some(&a)), None);
    }
}
