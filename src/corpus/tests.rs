use super::*;
use std::path::Path;

const ARRAY: &str = r#"[
  {"id": "g1", "story_genre": "horror", "story_setup": "A family moves into a haunted house.", "twist": "They are the ghosts.", "tags": ["ghost", " identity "]},
  {"id": "g2", "genre": "thriller", "story_setup": "A detective hunts a killer.", "twist": "The detective is the killer."}
]"#;

#[test]
fn test_parse_array_with_alias_and_defaults() {
    let examples = parse_corpus(ARRAY, CorpusFormat::JsonArray).unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].genre, "horror");
    assert_eq!(examples[0].tags, vec!["ghost", "identity"]);
    assert_eq!(examples[1].genre, "thriller");
    assert!(examples[1].tags.is_empty());
}

#[test]
fn test_missing_genre_is_unknown() {
    let raw = r#"[{"id": "x", "story_setup": "setup", "twist": "twist"}]"#;
    let examples = parse_corpus(raw, CorpusFormat::JsonArray).unwrap();
    assert_eq!(examples[0].genre, "unknown");
}

#[test]
fn test_parse_jsonl_skips_blank_lines() {
    let raw = concat!(
        r#"{"id": "a", "story_setup": "s1", "twist": "t1"}"#,
        "\n\n",
        r#"{"id": "b", "story_setup": "s2", "twist": "t2"}"#,
        "\n"
    );
    let examples = parse_corpus(raw, CorpusFormat::JsonLines).unwrap();
    assert_eq!(examples.len(), 2);
}

#[test]
fn test_parse_jsonl_reports_line() {
    let raw = concat!(r#"{"id": "a", "story_setup": "s1", "twist": "t1"}"#, "\n{oops\n");
    let err = parse_corpus(raw, CorpusFormat::JsonLines).unwrap_err();
    assert!(matches!(err, CorpusError::Parse { line: Some(2), .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_duplicate_ids_rejected() {
    let raw = r#"[
      {"id": "a", "story_setup": "s1", "twist": "t1"},
      {"id": " a ", "story_setup": "s2", "twist": "t2"}
    ]"#;
    let err = parse_corpus(raw, CorpusFormat::JsonArray).unwrap_err();
    assert!(matches!(err, CorpusError::DuplicateId { ref id } if id == "a"));
}

#[test]
fn test_empty_twist_rejected() {
    let raw = r#"[{"id": "a", "story_setup": "s1", "twist": "   "}]"#;
    let err = parse_corpus(raw, CorpusFormat::JsonArray).unwrap_err();
    assert!(matches!(err, CorpusError::Invalid { .. }));
}

#[test]
fn test_empty_corpus_rejected() {
    assert!(matches!(
        parse_corpus("[]", CorpusFormat::JsonArray),
        Err(CorpusError::Empty)
    ));
    assert!(matches!(
        parse_corpus("\n", CorpusFormat::JsonLines),
        Err(CorpusError::Empty)
    ));
}

#[test]
fn test_format_from_path() {
    assert_eq!(
        CorpusFormat::from_path(Path::new("a/twists.jsonl")),
        CorpusFormat::JsonLines
    );
    assert_eq!(
        CorpusFormat::from_path(Path::new("a/twists.NDJSON")),
        CorpusFormat::JsonLines
    );
    assert_eq!(
        CorpusFormat::from_path(Path::new("a/twists.json")),
        CorpusFormat::JsonArray
    );
}

#[test]
fn test_load_corpus_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("twists.json");
    std::fs::write(&path, ARRAY).unwrap();

    let corpus = load_corpus(&path).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0].id, "g1");
}

#[test]
fn test_load_corpus_missing_file() {
    let err = load_corpus(Path::new("/nonexistent/twists.json")).unwrap_err();
    assert!(matches!(err, CorpusError::Io { .. }));
}

#[test]
fn test_genre_matches_case_insensitive() {
    let examples = parse_corpus(ARRAY, CorpusFormat::JsonArray).unwrap();
    assert!(examples[0].genre_matches("Horror"));
    assert!(!examples[0].genre_matches("sci-fi"));
}
