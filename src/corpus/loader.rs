use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::CorpusError;
use super::model::TwistExample;

/// On-disk corpus layout, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// A single JSON array.
    JsonArray,
    /// One JSON object per line (`.jsonl` / `.ndjson`).
    JsonLines,
}

impl CorpusFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                Self::JsonLines
            }
            _ => Self::JsonArray,
        }
    }
}

/// Reads, validates and normalises the corpus at `path`.
pub fn load_corpus(path: &Path) -> Result<Arc<[TwistExample]>, CorpusError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let format = CorpusFormat::from_path(path);
    let examples = parse_corpus(&raw, format)?;

    info!(
        path = %path.display(),
        ?format,
        examples = examples.len(),
        "Loaded twist corpus"
    );

    Ok(examples.into())
}

/// Parses corpus text in the given format and validates every example.
pub fn parse_corpus(raw: &str, format: CorpusFormat) -> Result<Vec<TwistExample>, CorpusError> {
    let examples: Vec<TwistExample> = match format {
        CorpusFormat::JsonArray => {
            serde_json::from_str(raw).map_err(|source| CorpusError::Parse { line: None, source })?
        }
        CorpusFormat::JsonLines => {
            let mut out = Vec::new();
            for (i, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let example = serde_json::from_str(line).map_err(|source| CorpusError::Parse {
                    line: Some(i + 1),
                    source,
                })?;
                out.push(example);
            }
            out
        }
    };

    validate(examples)
}

fn validate(examples: Vec<TwistExample>) -> Result<Vec<TwistExample>, CorpusError> {
    if examples.is_empty() {
        return Err(CorpusError::Empty);
    }

    let mut seen = HashSet::with_capacity(examples.len());
    let mut out = Vec::with_capacity(examples.len());

    for example in examples {
        let example = example.normalize();

        if example.id.is_empty() {
            return Err(CorpusError::Invalid {
                id: String::new(),
                reason: "id is empty".to_string(),
            });
        }
        if example.story_setup.is_empty() {
            return Err(CorpusError::Invalid {
                id: example.id,
                reason: "story_setup is empty".to_string(),
            });
        }
        if example.twist.is_empty() {
            return Err(CorpusError::Invalid {
                id: example.id,
                reason: "twist is empty".to_string(),
            });
        }
        if !seen.insert(example.id.clone()) {
            return Err(CorpusError::DuplicateId { id: example.id });
        }

        out.push(example);
    }

    debug!(examples = out.len(), "Corpus validated");
    Ok(out)
}
