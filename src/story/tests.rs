use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::embedding::SentenceEmbedder;
use crate::generation::{
    GenerationOptions, GeneratorError, MockGenerator, ScriptedGenerator, TextGenerator,
};
use crate::moderation::ContentModerator;

fn story_generator(generator: Arc<dyn TextGenerator>) -> StoryGenerator {
    StoryGenerator::new(Arc::new(SentenceEmbedder::stub()), generator)
}

#[tokio::test]
async fn test_mystery_story_has_distinct_fields() {
    let story = story_generator(Arc::new(MockGenerator::new()))
        .generate(StoryRequest::new("mystery"))
        .await
        .unwrap();

    assert!(!story.story_setup.is_empty());
    assert!(!story.hidden_twist.is_empty());
    assert_ne!(story.story_setup, story.hidden_twist);
    assert_eq!(story.genre, "mystery");
    assert_eq!(story.difficulty, Difficulty::Medium);
}

#[tokio::test]
async fn test_defaults_to_mystery() {
    let generator = Arc::new(ScriptedGenerator::new([
        "SETUP: A locked gallery loses a painting.\nTWIST: The curator painted the forgery.",
    ]));
    let story = story_generator(generator.clone())
        .generate(StoryRequest::default())
        .await
        .unwrap();
    assert_eq!(story.genre, DEFAULT_GENRE);
    assert!(generator.requests()[0].user.contains("mystery story"));
}

#[tokio::test]
async fn test_difficulty_reaches_prompt() {
    let generator = Arc::new(ScriptedGenerator::new([
        "SETUP: A knight guards a bridge.\nTWIST: The bridge guards the knight.",
    ]));
    let story = story_generator(generator.clone())
        .generate(StoryRequest::new(" Fantasy ").with_difficulty(Difficulty::Hard))
        .await
        .unwrap();
    assert_eq!(story.genre, "fantasy");
    assert_eq!(story.difficulty, Difficulty::Hard);
    assert!(generator.requests()[0].user.contains(Difficulty::Hard.hint()));
}

#[tokio::test]
async fn test_unparseable_retries_with_strict_prompt() {
    let generator = Arc::new(ScriptedGenerator::new([
        "Once upon a time there was a story without headers.",
        "SETUP: A ship drifts in fog.\nTWIST: The crew are the fog.",
    ]));
    let story = story_generator(generator.clone())
        .generate(StoryRequest::new("horror"))
        .await
        .unwrap();

    assert_eq!(story.story_setup, "A ship drifts in fog.");
    assert_eq!(story.hidden_twist, "The crew are the fog.");

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].options, GenerationOptions::STORY);
    assert_eq!(requests[1].options, GenerationOptions::STORY_STRICT);
}

#[tokio::test]
async fn test_identical_sections_rejected() {
    let generator = Arc::new(ScriptedGenerator::new([
        "SETUP: The same sentence.\nTWIST: the same sentence.",
        "SETUP: Also the same.\nTWIST: Also the same.",
    ]));
    let err = story_generator(generator.clone())
        .generate(StoryRequest::new("mystery"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Unparseable { attempts: 2 }));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_near_duplicate_sections_rejected() {
    // Same words, different punctuation: identical stub embeddings.
    let generator = Arc::new(ScriptedGenerator::new([
        "SETUP: The butler, did it!\nTWIST: The butler did it.",
        "SETUP: A heist goes wrong.\nTWIST: Nothing was ever stolen.",
    ]));
    let story = story_generator(generator.clone())
        .generate(StoryRequest::new("mystery"))
        .await
        .unwrap();
    assert_eq!(story.hidden_twist, "Nothing was ever stolen.");
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_moderation_rejects_story() {
    let generator = Arc::new(ScriptedGenerator::new([
        "SETUP: Blood and death everywhere.\nTWIST: More blood and murder.",
        "SETUP: A quiet town hides a secret.\nTWIST: The town is a film set.",
    ]));
    let story = story_generator(generator)
        .with_moderator(ContentModerator::new())
        .generate(StoryRequest::new("thriller"))
        .await
        .unwrap();
    assert_eq!(story.hidden_twist, "The town is a film set.");
}

#[tokio::test]
async fn test_model_error_surfaces() {
    let generator = Arc::new(ScriptedGenerator::from_results([Err(
        GeneratorError::Provider {
            message: "unauthorized".to_string(),
        },
    )]));
    let err = story_generator(generator)
        .generate(StoryRequest::new("mystery"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Model(_)));
    assert_eq!(err.code(), "model_error");
}

#[tokio::test]
async fn test_timeout() {
    let generator = Arc::new(
        ScriptedGenerator::new(["SETUP: a\nTWIST: b"]).with_delay(Duration::from_secs(5)),
    );
    let err = story_generator(generator)
        .with_timeout(Duration::from_millis(50))
        .generate(StoryRequest::new("mystery"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Timeout { .. }));
}

#[tokio::test]
async fn test_empty_response_counts_as_failed_attempt() {
    let generator = Arc::new(ScriptedGenerator::from_results([
        Err(GeneratorError::EmptyResponse),
        Ok("SETUP: A clock stops.\nTWIST: Time itself stopped.".to_string()),
    ]));
    let story = story_generator(generator)
        .generate(StoryRequest::new("sci-fi"))
        .await
        .unwrap();
    assert_eq!(story.story_setup, "A clock stops.");
}

#[test]
fn test_difficulty_parse_and_serde() {
    assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    assert!("extreme".parse::<Difficulty>().is_err());
    let req: StoryRequest = serde_json::from_str(r#"{"difficulty":"easy"}"#).unwrap();
    assert_eq!(req.resolved_difficulty(), Difficulty::Easy);
    assert_eq!(req.resolved_genre(), "mystery");
}
