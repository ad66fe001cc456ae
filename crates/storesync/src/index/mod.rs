//! Vector index loading.
//!
//! Documents receive identifiers from an [`IdPolicy`], are embedded by an
//! [`Embedder`], and are upserted into a [`VectorIndex`] by the
//! [`IndexUpserter`], which creates the index first if it does not exist.

mod document;
mod hasher;
pub mod openai;
pub mod pinecone;
mod policy;
mod upsert;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Result;
use crate::config::IndexConfig;

pub use document::{Document, LoadMode, load_documents};
pub use hasher::ContentHasher;
pub use policy::IdPolicy;
pub use upsert::{IndexUpserter, UpsertReport};

/// Produces embedding vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input, returning one vector per input in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Readiness and placement of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub name: String,
    pub ready: bool,
    /// Data plane host serving upserts.
    pub host: Option<String>,
}

/// A vector with its identifier and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// A vector index service.
///
/// Upserts insert or replace vectors by id; that guarantee belongs to the
/// service.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Names of the existing indexes.
    async fn list_indexes(&self) -> Result<Vec<String>>;

    /// Create an index with the configured dimension, metric and placement.
    async fn create_index(&self, config: &IndexConfig) -> Result<()>;

    /// Describe an index.
    async fn describe_index(&self, name: &str) -> Result<IndexStatus>;

    /// Insert or replace vectors in a namespace. Returns the number upserted.
    async fn upsert(&self, index: &IndexStatus, namespace: &str, vectors: &[Vector])
    -> Result<usize>;
}
