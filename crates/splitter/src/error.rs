//! Error types for the splitter pipeline.

use crate::namespace::Namespace;
use corelib::{ShardKey, SplitKey};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the splitter pipeline.
pub type Result<T> = std::result::Result<T, SplitterError>;

/// Errors raised by a chunk metadata source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} at record {record}: {message}")]
    Parse {
        path: PathBuf,
        record: usize,
        message: String,
    },

    /// A metadata record the source could not turn into a chunk.
    #[error(transparent)]
    Metadata(#[from] corelib::Error),

    /// Backend specific failure (connectivity, authorization, ...).
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Errors from a partitioning pass.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// Failure reported by the metadata source, passed through unchanged.
    #[error("chunk metadata source `{source_name}` failed: {source}")]
    Source {
        source_name: &'static str,
        #[source]
        source: SourceError,
    },

    #[error("invalid namespace `{0}`, expected <database>.<collection>")]
    InvalidNamespace(String),

    #[error("namespace {0} is not sharded")]
    NotSharded(Namespace),

    #[error("split key `{split_key}` is not a prefix of shard key {shard_key} for {namespace}")]
    SplitKeyNotPrefix {
        namespace: Namespace,
        split_key: SplitKey,
        shard_key: ShardKey,
    },

    #[error(transparent)]
    Translate(#[from] corelib::Error),
}

impl SplitterError {
    /// True when the pass failed because of corrupt chunk metadata, whether
    /// the source or the translator detected it.
    pub fn is_malformed_chunk(&self) -> bool {
        match self {
            SplitterError::Translate(e) => e.is_malformed_chunk(),
            SplitterError::Source {
                source: SourceError::Metadata(e),
                ..
            } => e.is_malformed_chunk(),
            _ => false,
        }
    }
}
