//! In-memory chunk metadata source.

use crate::error::SourceError;
use crate::namespace::Namespace;
use crate::source::ChunkMetadataSource;
use async_trait::async_trait;
use corelib::{ChunkRecord, ShardKey};
use std::collections::HashMap;

/// Chunk metadata held in memory, keyed by namespace.
///
/// # Example
///
/// ```rust
/// use corelib::{ChunkRecord, ShardKey};
/// use serde_json::json;
/// use splitter::{InMemorySource, Namespace};
///
/// let doc = |v: serde_json::Value| v.as_object().cloned().unwrap();
/// let source = InMemorySource::new().with_collection(
///     Namespace::new("shop", "orders"),
///     "customer".parse::<ShardKey>().unwrap(),
///     vec![ChunkRecord::new(
///         doc(json!({"customer": {"$minKey": 1}})),
///         doc(json!({"customer": {"$maxKey": 1}})),
///     )],
/// );
/// assert_eq!(source.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    chunks: HashMap<Namespace, Vec<ChunkRecord>>,
    shard_keys: HashMap<Namespace, ShardKey>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sharded collection with its shard key and chunks.
    pub fn with_collection(
        mut self,
        namespace: Namespace,
        shard_key: ShardKey,
        chunks: Vec<ChunkRecord>,
    ) -> Self {
        self.shard_keys.insert(namespace.clone(), shard_key);
        self.chunks.insert(namespace, chunks);
        self
    }

    /// Register chunks without a known shard key.
    pub fn with_chunks(mut self, namespace: Namespace, chunks: Vec<ChunkRecord>) -> Self {
        self.chunks.insert(namespace, chunks);
        self
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl ChunkMetadataSource for InMemorySource {
    async fn chunks(&self, namespace: &Namespace) -> Result<Vec<ChunkRecord>, SourceError> {
        Ok(self.chunks.get(namespace).cloned().unwrap_or_default())
    }

    async fn shard_key(&self, namespace: &Namespace) -> Result<Option<ShardKey>, SourceError> {
        Ok(self.shard_keys.get(namespace).cloned())
    }

    fn name(&self) -> &'static str {
        "InMemorySource"
    }
}
