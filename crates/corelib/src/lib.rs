//! Core library for translating sharded chunk metadata into partition bounds.
//!
//! This crate provides the pure, I/O-free pieces:
//! - Bound values with `$minKey` / `$maxKey` sentinels and their ordering
//! - Extended-JSON documents and field lookup
//! - Shard keys and split keys
//! - Chunk records and partition boundaries
//! - The chunk-to-bound translator

pub mod bounds;
pub mod chunk;
pub mod document;
pub mod error;
pub mod key;
pub mod translator;
pub mod value;

pub use bounds::PartitionBoundary;
pub use chunk::ChunkRecord;
pub use document::Document;
pub use error::{Error, Result};
pub use key::{ShardKey, SplitKey};
pub use translator::{translate, translate_chunk, translate_metadata};
pub use value::BoundValue;
