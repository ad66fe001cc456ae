//! Idempotent document upserts into a vector index.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::IndexConfig;
use crate::error::IndexError;

use super::document::Document;
use super::{Embedder, IndexStatus, Vector, VectorIndex};

/// Metadata key holding the document text.
pub const TEXT_KEY: &str = "text";

/// Summary of one upsert batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertReport {
    /// The index had to be created first.
    pub index_created: bool,
    /// Vectors submitted.
    pub upserted: usize,
    /// Documents dropped because an earlier document in the batch had the
    /// same id.
    pub duplicates: usize,
    /// Ids of the submitted vectors, in submission order.
    pub ids: Vec<String>,
}

/// Ensures the target index exists, then embeds and upserts documents.
pub struct IndexUpserter<E, V> {
    embedder: E,
    index: V,
    config: IndexConfig,
}

impl<E: Embedder, V: VectorIndex> IndexUpserter<E, V> {
    pub fn new(embedder: E, index: V, config: IndexConfig) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Create the index if it is missing and wait until it is ready.
    ///
    /// Readiness is polled every `poll_interval` with no upper bound.
    /// Returns the ready index and whether it was created by this call.
    #[instrument(skip(self), fields(index = %self.config.name))]
    pub async fn ensure_index(&self) -> Result<(IndexStatus, bool)> {
        let existing = self.index.list_indexes().await?;
        let created = !existing.iter().any(|name| name == &self.config.name);

        if created {
            info!(
                dimension = self.config.dimension,
                metric = %self.config.metric,
                cloud = %self.config.cloud,
                region = %self.config.region,
                "Creating index"
            );
            self.index.create_index(&self.config).await?;
        }

        loop {
            let status = self.index.describe_index(&self.config.name).await?;
            if status.ready {
                debug!(host = ?status.host, "Index ready");
                return Ok((status, created));
            }
            debug!("Index not ready, waiting");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Assign ids, embed and upsert a batch of documents.
    ///
    /// Ids come from the configured [`IdPolicy`](super::IdPolicy) and are
    /// also written to each document's `metadata.id`. Documents whose id
    /// repeats within the batch are dropped after the first.
    ///
    /// Embedding and upserting proceed in chunks of `batch_size` documents.
    /// A failing chunk leaves the chunks before it upserted.
    #[instrument(skip(self, documents), fields(index = %self.config.name, namespace = %self.config.namespace, policy = %self.config.id_policy))]
    pub async fn upsert(&self, documents: Vec<Document>) -> Result<UpsertReport> {
        let (status, index_created) = self.ensure_index().await?;

        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(documents.len());
        let mut duplicates = 0;
        for mut document in documents {
            let id = self.config.id_policy.assign(&mut document);
            if seen.insert(id.clone()) {
                batch.push((id, document));
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!(duplicates, "Dropped documents with repeated ids");
        }

        if batch.is_empty() {
            return Ok(UpsertReport {
                index_created,
                upserted: 0,
                duplicates,
                ids: Vec::new(),
            });
        }

        let mut ids = Vec::with_capacity(batch.len());
        let mut upserted = 0;
        for chunk in batch.chunks(self.config.batch_size.get()) {
            let vectors = self.embed_chunk(chunk).await?;
            upserted += self
                .index
                .upsert(&status, &self.config.namespace, &vectors)
                .await?;
            ids.extend(vectors.into_iter().map(|v| v.id));
            debug!(upserted, "Upserted chunk");
        }

        info!(upserted, index_created, "Documents upserted");

        Ok(UpsertReport {
            index_created,
            upserted,
            duplicates,
            ids,
        })
    }

    /// Embed one chunk of documents into vectors, checking the embedder's
    /// output against the chunk and the index dimension.
    async fn embed_chunk(&self, chunk: &[(String, Document)]) -> Result<Vec<Vector>> {
        let inputs: Vec<String> = chunk.iter().map(|(_, doc)| doc.content.clone()).collect();
        let embeddings = self.embedder.embed(&inputs).await?;
        if embeddings.len() != chunk.len() {
            return Err(IndexError::EmbeddingCount {
                expected: chunk.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        chunk
            .iter()
            .zip(embeddings)
            .map(|((id, document), values)| {
                if values.len() != self.config.dimension {
                    return Err(IndexError::Dimension {
                        expected: self.config.dimension,
                        actual: values.len(),
                    }
                    .into());
                }
                let mut metadata = document.metadata.clone();
                metadata.insert(
                    TEXT_KEY.to_string(),
                    Value::String(document.content.clone()),
                );
                Ok(Vector {
                    id: id.clone(),
                    values,
                    metadata,
                })
            })
            .collect()
    }
}
