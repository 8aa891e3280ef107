//! Partition bounds for parallel reads of sharded collections.
//!
//! This crate wires the pure translator from `corelib` to a chunk metadata
//! source:
//! - Namespaces
//! - Pluggable chunk metadata sources (in-memory, JSON export)
//! - The sharded splitter pipeline

pub mod error;
pub mod namespace;
pub mod sharded;
pub mod source;

pub use error::{Result, SourceError, SplitterError};
pub use namespace::Namespace;
pub use sharded::ShardedSplitter;
pub use source::{
    ChunkMetadataSource, CollectionMetadata, InMemorySource, JsonFileSource, NamespaceSummary,
};
