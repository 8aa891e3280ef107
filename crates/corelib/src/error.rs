//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A chunk record without a usable value (real or sentinel) for a
    /// split-key field. Aborts the whole partitioning pass.
    #[error("malformed chunk at index {index}: {reason}")]
    MalformedChunk { index: usize, reason: String },

    /// Invalid shard key or split key definition.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A document that does not have the expected shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl Error {
    /// Builds a [`Error::MalformedChunk`] for the chunk at `index`.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedChunk {
            index,
            reason: reason.into(),
        }
    }

    /// True for errors that indicate corrupt chunk metadata.
    pub fn is_malformed_chunk(&self) -> bool {
        matches!(self, Error::MalformedChunk { .. })
    }
}
