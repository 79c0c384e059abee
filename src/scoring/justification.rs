//! Human-readable explanation of a score.

use super::types::{ScoreBand, Signal};

const LISTED_KEYWORDS: usize = 5;
const UNCERTAIN_BELOW: f32 = 0.6;

fn signal_sentence(signal: Signal) -> &'static str {
    match signal {
        Signal::Exact => "Your guess matches the twist word for word.",
        Signal::Semantic => "Most of the score comes from similar meaning.",
        Signal::Lexical => "Most of the score comes from shared wording.",
        Signal::Tag => "Most of the score comes from matching tags.",
    }
}

/// Band text, then the dominant signal, then the shared keywords.
pub fn justify(score: f32, dominant: Signal, shared: &[String], confidence: f32) -> String {
    let band = ScoreBand::from_score(score);

    let keywords = if shared.is_empty() {
        "No keywords in common.".to_string()
    } else {
        let listed: Vec<&str> = shared
            .iter()
            .take(LISTED_KEYWORDS)
            .map(String::as_str)
            .collect();
        format!("Shared keywords: {}.", listed.join(", "))
    };

    let mut text = format!("{} {} {}", band.text(), signal_sentence(dominant), keywords);
    if confidence < UNCERTAIN_BELOW {
        text.push_str(" Note: this score has moderate uncertainty.");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justify_structure() {
        let shared = vec!["butler".to_string()];
        let text = justify(74.0, Signal::Semantic, &shared, 0.8);
        assert_eq!(
            text,
            "Very close guess, a strong match. Most of the score comes from similar meaning. \
             Shared keywords: butler."
        );
    }

    #[test]
    fn test_justify_no_keywords_and_uncertain() {
        let text = justify(5.0, Signal::Semantic, &[], 0.4);
        assert!(text.starts_with("Quite different from the actual twist."));
        assert!(text.contains("No keywords in common."));
        assert!(text.ends_with("moderate uncertainty."));
    }

    #[test]
    fn test_justify_lists_at_most_five() {
        let shared: Vec<String> = (0..8).map(|i| format!("k{i}")).collect();
        let text = justify(50.0, Signal::Lexical, &shared, 1.0);
        assert!(text.contains("k4."));
        assert!(!text.contains("k5"));
    }
}
