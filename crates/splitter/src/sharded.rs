//! Split bounds for a sharded collection.
//!
//! Retrieves the chunk layout of a namespace from a [`ChunkMetadataSource`]
//! and produces one partition boundary per chunk.
//!
//! # Algorithm
//!
//! 1. Fetch the shard key and chunk records once
//! 2. Optionally check the split key against the collection's shard key
//! 3. Translate every chunk; the first malformed chunk fails the pass
//!
//! Errors are all-or-nothing: a partial boundary list would leave part of
//! the key space unscanned.

use crate::error::{Result, SplitterError};
use crate::namespace::Namespace;
use crate::source::ChunkMetadataSource;
use corelib::{translate, PartitionBoundary, SplitKey};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info};

/// Computes split bounds for sharded collections.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use splitter::{InMemorySource, ShardedSplitter};
///
/// let splitter = ShardedSplitter::new(Arc::new(InMemorySource::new()))
///     .with_prefix_check(false);
/// assert!(!splitter.prefix_check());
/// ```
#[derive(Debug)]
pub struct ShardedSplitter<S> {
    source: Arc<S>,
    prefix_check: bool,
}

impl<S> Clone for ShardedSplitter<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            prefix_check: self.prefix_check,
        }
    }
}

impl<S: ChunkMetadataSource> ShardedSplitter<S> {
    /// Create a splitter over `source`. Prefix checking is enabled.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            prefix_check: true,
        }
    }

    /// Reject split keys that are not a prefix of the shard key, when the
    /// source knows the shard key.
    pub fn with_prefix_check(mut self, enabled: bool) -> Self {
        self.prefix_check = enabled;
        self
    }

    pub fn prefix_check(&self) -> bool {
        self.prefix_check
    }

    /// Get the split bounds of `namespace` over `key`.
    ///
    /// # Returns
    /// One boundary per chunk, in the order the source returned the chunks.
    pub async fn split_bounds(
        &self,
        namespace: &Namespace,
        key: &SplitKey,
    ) -> Result<Vec<PartitionBoundary>> {
        debug!(
            namespace = %namespace,
            split_key = %key,
            source = self.source.name(),
            "getting split bounds for sharded collection"
        );
        counter!("splitter_passes_total").increment(1);

        let result = self.compute(namespace, key).await;
        match &result {
            Ok(bounds) => {
                counter!("splitter_bounds_total").increment(bounds.len() as u64);
                info!(
                    namespace = %namespace,
                    split_key = %key,
                    bounds = bounds.len(),
                    degenerate = bounds.iter().filter(|b| b.is_degenerate()).count(),
                    "computed split bounds"
                );
            }
            Err(e) if e.is_malformed_chunk() => {
                counter!("splitter_malformed_chunks_total").increment(1);
            }
            Err(_) => {}
        }
        result
    }

    async fn compute(&self, namespace: &Namespace, key: &SplitKey) -> Result<Vec<PartitionBoundary>> {
        let metadata = self
            .source
            .metadata(namespace)
            .await
            .map_err(|source| self.source_error(source))?;

        if self.prefix_check {
            if let Some(shard_key) = metadata.shard_key {
                if !shard_key.is_prefix(key) {
                    return Err(SplitterError::SplitKeyNotPrefix {
                        namespace: namespace.clone(),
                        split_key: key.clone(),
                        shard_key,
                    });
                }
            }
        }

        // A sharded collection always has at least one chunk,
        // e.g. {min: {key: {$minKey: 1}}, max: {key: {$maxKey: 1}}}
        if metadata.chunks.is_empty() {
            return Err(SplitterError::NotSharded(namespace.clone()));
        }

        Ok(translate(&metadata.chunks, key)?)
    }

    fn source_error(&self, source: crate::error::SourceError) -> SplitterError {
        SplitterError::Source {
            source_name: self.source.name(),
            source,
        }
    }
}
