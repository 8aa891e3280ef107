//! Chunk metadata sources.
//!
//! A source answers "what are the current chunks of this namespace?". It is
//! the only I/O-bound step of a partitioning pass; timeouts and connection
//! handling belong to the implementation, not to the translator.
//!
//! - **InMemorySource**: chunks registered up front (tests, embedding)
//! - **JsonFileSource**: an export of the `config.chunks` collection

pub mod file;
pub mod memory;

pub use file::{JsonFileSource, NamespaceSummary};
pub use memory::InMemorySource;

use crate::error::SourceError;
use crate::namespace::Namespace;
use async_trait::async_trait;
use corelib::{ChunkRecord, ShardKey};

/// Everything one partitioning pass needs to know about a namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionMetadata {
    /// The shard key, when the source knows it.
    pub shard_key: Option<ShardKey>,
    /// Chunk records in the order the metadata service returned them.
    pub chunks: Vec<ChunkRecord>,
}

/// Trait for chunk metadata sources.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as a single source is
/// shared by every partitioning pass.
#[async_trait]
pub trait ChunkMetadataSource: Send + Sync + 'static {
    /// Fetch the chunk records of `namespace`, in the order the metadata
    /// service returned them.
    ///
    /// An unsharded or unknown namespace yields an empty list.
    async fn chunks(&self, namespace: &Namespace) -> Result<Vec<ChunkRecord>, SourceError>;

    /// Fetch the shard key of `namespace`, if the source knows it.
    async fn shard_key(&self, _namespace: &Namespace) -> Result<Option<ShardKey>, SourceError> {
        Ok(None)
    }

    /// Fetch the shard key and chunks of `namespace` together.
    ///
    /// Sources that can answer both from one read should override this.
    async fn metadata(&self, namespace: &Namespace) -> Result<CollectionMetadata, SourceError> {
        let shard_key = self.shard_key(namespace).await?;
        let chunks = self.chunks(namespace).await?;
        Ok(CollectionMetadata { shard_key, chunks })
    }

    /// Get the source name (for logging/debugging).
    fn name(&self) -> &'static str;
}
