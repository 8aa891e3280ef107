//! Chunk records as stored by the cluster metadata service.

use crate::document::Document;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One contiguous shard-key range: `[min, max)` over the full shard key.
///
/// At the extremes of a collection `min`/`max` hold the `$minKey` /
/// `$maxKey` sentinels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub min: Document,
    pub max: Document,
}

impl ChunkRecord {
    pub fn new(min: Document, max: Document) -> Self {
        Self { min, max }
    }

    /// Reads the `min` / `max` fields of a raw metadata document. Any other
    /// fields (`ns`, `shard`, `lastmod`, ...) are ignored.
    ///
    /// `index` is the position of the record in the metadata result and is
    /// reported in the error.
    pub fn from_metadata(doc: &Document, index: usize) -> Result<Self> {
        let min = bound_document(doc, "min", index)?;
        let max = bound_document(doc, "max", index)?;
        Ok(Self::new(min, max))
    }
}

fn bound_document(doc: &Document, field: &str, index: usize) -> Result<Document> {
    match doc.get(field) {
        Some(Value::Object(bound)) => Ok(bound.clone()),
        Some(other) => Err(Error::malformed(
            index,
            format!("`{}` is not a document: {}", field, other),
        )),
        None => Err(Error::malformed(index, format!("missing `{}`", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_metadata() {
        let raw = json!({
            "_id": "db.users-a_MinKey",
            "ns": "db.users",
            "min": {"a": {"$minKey": 1}},
            "max": {"a": 10},
            "shard": "shard0000"
        });
        let chunk = ChunkRecord::from_metadata(raw.as_object().unwrap(), 0).unwrap();
        assert_eq!(Value::Object(chunk.max.clone()), json!({"a": 10}));
        assert_eq!(chunk.min.len(), 1);
    }

    #[test]
    fn test_missing_bound_is_malformed() {
        let raw = json!({"min": {"a": 1}});
        let err = ChunkRecord::from_metadata(raw.as_object().unwrap(), 4).unwrap_err();
        assert_eq!(err, Error::malformed(4, "missing `max`"));

        let raw = json!({"min": 1, "max": {"a": 2}});
        let err = ChunkRecord::from_metadata(raw.as_object().unwrap(), 0).unwrap_err();
        assert!(err.is_malformed_chunk());
    }
}
