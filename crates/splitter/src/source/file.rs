//! Chunk metadata read from a JSON export of the config database.
//!
//! The chunks file holds `config.chunks` documents, either as one JSON array
//! or one document per line (`mongoexport` style). An optional collections
//! file holds `config.collections` documents and provides shard keys. Newer
//! metadata identifies a chunk's collection by `uuid` instead of `ns`; both
//! are matched when the collections file is available.

use crate::error::SourceError;
use crate::namespace::Namespace;
use crate::source::{ChunkMetadataSource, CollectionMetadata};
use async_trait::async_trait;
use corelib::document::as_document;
use corelib::{ChunkRecord, Document, ShardKey};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Chunk counts for one namespace of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSummary {
    pub namespace: String,
    pub chunks: usize,
    pub shard_key: Option<ShardKey>,
}

/// Reads chunk metadata from exported JSON files.
///
/// Files are re-read on every call, so each partitioning pass sees the
/// current export.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    chunks_path: PathBuf,
    collections_path: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new(chunks_path: impl Into<PathBuf>) -> Self {
        Self {
            chunks_path: chunks_path.into(),
            collections_path: None,
        }
    }

    /// Also read `config.collections` from `path`.
    pub fn with_collections(mut self, path: impl Into<PathBuf>) -> Self {
        self.collections_path = Some(path.into());
        self
    }

    pub fn chunks_path(&self) -> &Path {
        &self.chunks_path
    }

    /// Chunk counts per namespace, sorted by namespace.
    pub async fn summary(&self) -> Result<Vec<NamespaceSummary>, SourceError> {
        let chunks = load_records(&self.chunks_path).await?;
        let collections = self.collections().await?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for chunk in &chunks {
            let label = match chunk.get("ns").and_then(Value::as_str) {
                Some(ns) => ns.to_string(),
                None => collections
                    .iter()
                    .find(|c| c.uuid.is_some() && c.uuid.as_ref() == chunk.get("uuid"))
                    .map(|c| c.namespace.clone())
                    .unwrap_or_else(|| "<unknown>".to_string()),
            };
            *counts.entry(label).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(namespace, chunks)| {
                let shard_key = collections
                    .iter()
                    .find(|c| c.namespace == namespace)
                    .and_then(|c| c.shard_key.clone());
                NamespaceSummary {
                    namespace,
                    chunks,
                    shard_key,
                }
            })
            .collect())
    }

    async fn collections(&self) -> Result<Vec<CollectionEntry>, SourceError> {
        let Some(path) = &self.collections_path else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for doc in load_records(path).await? {
            if doc.get("dropped").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            let Some(namespace) = doc.get("_id").and_then(Value::as_str) else {
                continue;
            };
            let shard_key = match doc.get("key") {
                Some(pattern) => Some(ShardKey::from_pattern(as_document(pattern, "collection key")?)?),
                None => None,
            };
            entries.push(CollectionEntry {
                namespace: namespace.to_string(),
                uuid: doc.get("uuid").cloned(),
                shard_key,
            });
        }
        Ok(entries)
    }

    async fn collection(&self, namespace: &Namespace) -> Result<Option<CollectionEntry>, SourceError> {
        let full_name = namespace.full_name();
        Ok(self
            .collections()
            .await?
            .into_iter()
            .find(|c| c.namespace == full_name))
    }

    /// Chunks of `namespace`, matched by `ns` or by the collection's `uuid`.
    async fn chunks_for(
        &self,
        namespace: &Namespace,
        entry: Option<&CollectionEntry>,
    ) -> Result<Vec<ChunkRecord>, SourceError> {
        let full_name = namespace.full_name();
        let uuid = entry.and_then(|c| c.uuid.as_ref());

        let records = load_records(&self.chunks_path).await?;
        let matching = records.iter().filter(|doc| {
            doc.get("ns").and_then(Value::as_str) == Some(full_name.as_str())
                || (uuid.is_some() && doc.get("uuid") == uuid)
        });

        let mut chunks = Vec::new();
        for (index, doc) in matching.enumerate() {
            chunks.push(ChunkRecord::from_metadata(doc, index)?);
        }

        debug!(
            namespace = %namespace,
            path = %self.chunks_path.display(),
            records = records.len(),
            chunks = chunks.len(),
            "loaded chunk metadata"
        );
        Ok(chunks)
    }
}

#[async_trait]
impl ChunkMetadataSource for JsonFileSource {
    async fn chunks(&self, namespace: &Namespace) -> Result<Vec<ChunkRecord>, SourceError> {
        let entry = self.collection(namespace).await?;
        self.chunks_for(namespace, entry.as_ref()).await
    }

    async fn shard_key(&self, namespace: &Namespace) -> Result<Option<ShardKey>, SourceError> {
        Ok(self.collection(namespace).await?.and_then(|c| c.shard_key))
    }

    /// Reads each export file once.
    async fn metadata(&self, namespace: &Namespace) -> Result<CollectionMetadata, SourceError> {
        let entry = self.collection(namespace).await?;
        let chunks = self.chunks_for(namespace, entry.as_ref()).await?;
        Ok(CollectionMetadata {
            shard_key: entry.and_then(|c| c.shard_key),
            chunks,
        })
    }

    fn name(&self) -> &'static str {
        "JsonFileSource"
    }
}

#[derive(Debug, Clone)]
struct CollectionEntry {
    namespace: String,
    uuid: Option<Value>,
    shard_key: Option<ShardKey>,
}

async fn load_records(path: &Path) -> Result<Vec<Document>, SourceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_records(path, &text)
}

/// Parses a JSON array of documents, or one document per line.
fn parse_records(path: &Path, text: &str) -> Result<Vec<Document>, SourceError> {
    let parse_error = |record: usize, message: String| SourceError::Parse {
        path: path.to_path_buf(),
        record,
        message,
    };

    let values: Vec<(usize, Value)> = if text.trim_start().starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(text).map_err(|e| parse_error(0, e.to_string()))?;
        values.into_iter().enumerate().collect()
    } else {
        let mut values = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| parse_error(line_no + 1, e.to_string()))?;
            values.push((line_no + 1, value));
        }
        values
    };

    values
        .into_iter()
        .map(|(record, value)| match value {
            Value::Object(doc) => Ok(doc),
            other => Err(parse_error(record, format!("expected a document, found {}", other))),
        })
        .collect()
}
