//! Chunk-to-partition-bound translation.
//!
//! Chunk boundaries are defined over the full shard key, but scans filter on
//! the split key only. Each chunk's `min`/`max` is projected onto the split
//! key, one boundary per chunk, in input order. Chunks are never merged or
//! deduplicated: when the split key is a strict prefix of the shard key,
//! adjacent boundaries may share values or be empty.
//!
//! # Example
//!
//! ```rust
//! use corelib::{translate, ChunkRecord, SplitKey};
//! use serde_json::json;
//!
//! let doc = |v: serde_json::Value| v.as_object().cloned().unwrap();
//! let chunks = vec![
//!     ChunkRecord::new(doc(json!({"a": {"$minKey": 1}})), doc(json!({"a": 5}))),
//!     ChunkRecord::new(doc(json!({"a": 5})), doc(json!({"a": {"$maxKey": 1}}))),
//! ];
//!
//! let key: SplitKey = "a".parse().unwrap();
//! let bounds = translate(&chunks, &key).unwrap();
//! assert!(bounds[0].lower().is_min_key());
//! assert!(bounds[1].upper().is_max_key());
//! ```

use crate::bounds::PartitionBoundary;
use crate::chunk::ChunkRecord;
use crate::document::{get_field, Document};
use crate::error::{Error, Result};
use crate::key::SplitKey;
use crate::value::BoundValue;
use tracing::warn;

/// Translates every chunk into a partition boundary over `key`.
///
/// The output has one boundary per chunk, in the same order. The first
/// malformed chunk aborts the whole translation; no partial result is
/// returned.
pub fn translate<'a, I>(chunks: I, key: &SplitKey) -> Result<Vec<PartitionBoundary>>
where
    I: IntoIterator<Item = &'a ChunkRecord>,
{
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| translate_chunk(chunk, index, key))
        .collect()
}

/// Translates raw metadata documents (each carrying `min` and `max`).
pub fn translate_metadata<'a, I>(docs: I, key: &SplitKey) -> Result<Vec<PartitionBoundary>>
where
    I: IntoIterator<Item = &'a Document>,
{
    docs.into_iter()
        .enumerate()
        .map(|(index, doc)| {
            let chunk = ChunkRecord::from_metadata(doc, index)?;
            translate_chunk(&chunk, index, key)
        })
        .collect()
}

/// Projects a single chunk onto `key`. `index` is only used for reporting.
///
/// A split-key field absent from `min` becomes `$minKey`, absent from `max`
/// becomes `$maxKey`. Absent from both is a malformed chunk.
pub fn translate_chunk(chunk: &ChunkRecord, index: usize, key: &SplitKey) -> Result<PartitionBoundary> {
    let mut min = Vec::with_capacity(key.len());
    let mut max = Vec::with_capacity(key.len());

    for field in key.fields() {
        let (lower, upper) = match (get_field(&chunk.min, field), get_field(&chunk.max, field)) {
            (None, None) => {
                return Err(Error::malformed(
                    index,
                    format!("split key field `{}` is absent from both min and max", field),
                ))
            }
            (Some(lower), Some(upper)) => (BoundValue::from_json(lower), BoundValue::from_json(upper)),
            (None, Some(upper)) => {
                warn!(chunk = index, field = %field, "split key field absent from chunk min, using $minKey");
                (BoundValue::MinKey, BoundValue::from_json(upper))
            }
            (Some(lower), None) => {
                warn!(chunk = index, field = %field, "split key field absent from chunk max, using $maxKey");
                (BoundValue::from_json(lower), BoundValue::MaxKey)
            }
        };
        min.push(lower);
        max.push(upper);
    }

    PartitionBoundary::new(key.clone(), min, max)
}
