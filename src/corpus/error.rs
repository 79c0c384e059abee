use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the twist corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse corpus{}: {source}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        line: Option<usize>,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid example '{id}': {reason}")]
    Invalid { id: String, reason: String },

    #[error("duplicate example id '{id}'")]
    DuplicateId { id: String },

    #[error("corpus contains no examples")]
    Empty,
}
