//! Documents and loading them from snapshot files.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::Result;
use crate::error::{InvalidInputError, StorageError};

/// A piece of text to embed, with metadata stored alongside its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The identifier assigned by an [`IdPolicy`](super::IdPolicy), if any.
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id").and_then(Value::as_str)
    }
}

/// How a JSON file is split into documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMode {
    /// One document holding the whole file.
    Whole,
    /// One document per `data.<field>.edges[].node`.
    PerRecord { field: String },
}

/// Load documents from a JSON file.
///
/// Content is the compact JSON serialization of the selected value. Each
/// document carries `source` (the file path) and `seq_num` (1-based)
/// metadata.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_documents(path: impl AsRef<Path>, mode: &LoadMode) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| InvalidInputError::Document {
        message: format!("{}: {}", path.display(), e),
    })?;

    let values = match mode {
        LoadMode::Whole => vec![value],
        LoadMode::PerRecord { field } => {
            let edges = value
                .pointer(&format!("/data/{}/edges", field))
                .and_then(Value::as_array)
                .ok_or_else(|| InvalidInputError::Document {
                    message: format!("{}: missing data.{}.edges", path.display(), field),
                })?;
            edges
                .iter()
                .filter_map(|edge| edge.get("node").cloned())
                .collect()
        }
    };

    let source = path.display().to_string();
    let documents: Vec<Document> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            Document::new(value.to_string())
                .with_metadata("source", source.clone())
                .with_metadata("seq_num", i + 1)
        })
        .collect();

    debug!(documents = documents.len(), "Loaded documents");
    Ok(documents)
}
