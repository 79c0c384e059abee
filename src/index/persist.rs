//! rkyv snapshots of a built index.
//!
//! Snapshots are written to a temp file and renamed into place, then memory-mapped
//! and validated (bytecheck) on load before anything is deserialized.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use rkyv::rancor::Error as RkyvError;
use tracing::{info, warn};

use super::error::{IndexError, IndexResult};
use super::model::IndexedEntry;
use super::{IndexKind, VectorIndex, build_index, index_from_entries};
use crate::constants::validate_embedding_dim;
use crate::corpus::TwistExample;
use crate::embedding::SentenceEmbedder;
use crate::hashing::corpus_fingerprint;

/// Bumped whenever the archived layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

const TEMP_EXTENSION: &str = "tmp";

#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub id: String,
    pub genre: String,
    pub story_setup: String,
    pub twist: String,
    pub tags: Vec<String>,
    pub vector: Vec<f32>,
}

/// Persisted image of an index plus the provenance needed to reject stale copies.
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub format_version: u32,
    pub embedding_dim: u32,
    pub embedder_fingerprint: u64,
    pub corpus_fingerprint: u64,
    /// RFC 3339 build time.
    pub built_at: String,
    pub entries: Vec<SnapshotEntry>,
}

impl IndexSnapshot {
    pub fn capture(index: &dyn VectorIndex, embedder_fingerprint: u64, corpus_fingerprint: u64) -> Self {
        let entries = index
            .entries()
            .iter()
            .map(|e| SnapshotEntry {
                id: e.example.id.clone(),
                genre: e.example.genre.clone(),
                story_setup: e.example.story_setup.clone(),
                twist: e.example.twist.clone(),
                tags: e.example.tags.clone(),
                vector: e.vector.clone(),
            })
            .collect();

        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            embedding_dim: index.dim() as u32,
            embedder_fingerprint,
            corpus_fingerprint,
            built_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }

    /// Atomically writes the snapshot to `path`.
    pub fn save(&self, path: &Path) -> IndexResult<()> {
        let io_err = |source: io::Error| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = rkyv::to_bytes::<RkyvError>(self).map_err(|e| IndexError::Corrupt {
            reason: format!("serialization failed: {e:?}"),
        })?;

        let temp_path = path.with_extension(TEMP_EXTENSION);
        {
            let mut file = File::create(&temp_path).map_err(io_err)?;
            file.write_all(&bytes).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&temp_path, path).map_err(io_err)?;

        info!(
            path = %path.display(),
            entries = self.entries.len(),
            bytes = bytes.len(),
            "Index snapshot saved"
        );
        Ok(())
    }

    /// Maps and validates the snapshot at `path` against the live embedder and corpus.
    pub fn load(
        path: &Path,
        embedder: &SentenceEmbedder,
        corpus: &[TwistExample],
    ) -> IndexResult<Self> {
        let io_err = |source: io::Error| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        if file.metadata().map_err(io_err)?.len() == 0 {
            return Err(IndexError::Corrupt {
                reason: "file is empty".to_string(),
            });
        }

        // SAFETY: the snapshot is only replaced by rename, never modified in place.
        let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;

        let archived = rkyv::access::<ArchivedIndexSnapshot, RkyvError>(&mmap[..]).map_err(
            |e| IndexError::Corrupt {
                reason: format!("validation failed: {e:?}"),
            },
        )?;

        let version = archived.format_version.to_native();
        if version != SNAPSHOT_FORMAT_VERSION {
            return Err(IndexError::Corrupt {
                reason: format!(
                    "unsupported format version {version} (expected {SNAPSHOT_FORMAT_VERSION})"
                ),
            });
        }

        validate_embedding_dim(
            archived.embedding_dim.to_native() as usize,
            embedder.embedding_dim(),
        )?;

        let embedder_fp = archived.embedder_fingerprint.to_native();
        if embedder_fp != embedder.fingerprint() {
            return Err(IndexError::Stale {
                reason: format!(
                    "built with embedder {embedder_fp:016x}, running {:016x}",
                    embedder.fingerprint()
                ),
            });
        }

        let expected_corpus = corpus_fingerprint(corpus);
        let corpus_fp = archived.corpus_fingerprint.to_native();
        if corpus_fp != expected_corpus {
            return Err(IndexError::Stale {
                reason: format!(
                    "built from corpus {corpus_fp:016x}, loaded corpus is {expected_corpus:016x}"
                ),
            });
        }

        let snapshot = rkyv::deserialize::<IndexSnapshot, RkyvError>(archived).map_err(|e| {
            IndexError::Corrupt {
                reason: format!("deserialization failed: {e:?}"),
            }
        })?;

        info!(
            path = %path.display(),
            entries = snapshot.entries.len(),
            built_at = %snapshot.built_at,
            "Index snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn into_entries(self) -> Vec<IndexedEntry> {
        self.entries
            .into_iter()
            .map(|e| IndexedEntry {
                example: TwistExample {
                    id: e.id,
                    genre: e.genre,
                    story_setup: e.story_setup,
                    twist: e.twist,
                    tags: e.tags,
                },
                vector: e.vector,
            })
            .collect()
    }
}

/// Loads the snapshot at `path`, or embeds the corpus when there is none.
///
/// A missing or stale snapshot is rebuilt and re-saved. Corruption and dimension
/// mismatches are returned to the caller.
pub fn load_or_build(
    path: Option<&Path>,
    kind: IndexKind,
    embedder: &SentenceEmbedder,
    corpus: &[TwistExample],
) -> IndexResult<Arc<dyn VectorIndex>> {
    let Some(path) = path else {
        return build_index(kind, corpus, embedder);
    };

    match IndexSnapshot::load(path, embedder, corpus) {
        Ok(snapshot) => index_from_entries(kind, snapshot.into_entries(), embedder.embedding_dim()),
        Err(IndexError::Stale { reason }) => {
            warn!(path = %path.display(), %reason, "Index snapshot is stale, rebuilding");
            rebuild_and_save(path, kind, embedder, corpus)
        }
        Err(IndexError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No index snapshot found, building");
            rebuild_and_save(path, kind, embedder, corpus)
        }
        Err(e) => Err(e),
    }
}

fn rebuild_and_save(
    path: &Path,
    kind: IndexKind,
    embedder: &SentenceEmbedder,
    corpus: &[TwistExample],
) -> IndexResult<Arc<dyn VectorIndex>> {
    let index = build_index(kind, corpus, embedder)?;
    let snapshot = IndexSnapshot::capture(
        index.as_ref(),
        embedder.fingerprint(),
        corpus_fingerprint(corpus),
    );
    if let Err(e) = snapshot.save(path) {
        warn!(error = %e, "Failed to persist rebuilt index; serving from memory");
    }
    Ok(index)
}
