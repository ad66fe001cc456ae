//! Pinecone-compatible vector index client.
//!
//! Index management goes through the control plane configured in
//! [`VectorServiceConfig`]; upserts go to the data plane host reported by
//! the index description.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Result;
use crate::config::{IndexConfig, VectorServiceConfig};
use crate::error::{IndexError, InvalidInputError};
use crate::http;
use crate::types::EndpointUrl;

use super::{IndexStatus, Vector, VectorIndex};

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const API_VERSION: &str = "2024-07";

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexModelStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexModelStatus {
    ready: bool,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [Vector],
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: Option<usize>,
}

/// A vector index service reached over HTTP.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    client: reqwest::Client,
    config: VectorServiceConfig,
}

impl PineconeIndex {
    pub fn new(config: VectorServiceConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            config,
        })
    }

    pub fn config(&self) -> &VectorServiceConfig {
        &self.config
    }

    /// Attach the API key and version headers.
    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let mut key = HeaderValue::from_str(self.config.api_key.expose()).map_err(|_| {
            InvalidInputError::Config {
                field: "api_key",
                reason: "contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        key.set_sensitive(true);
        Ok(request
            .header(API_KEY_HEADER, key)
            .header(API_VERSION_HEADER, API_VERSION))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self))]
    async fn list_indexes(&self) -> Result<Vec<String>> {
        let url = self.config.control_url.join("indexes");
        let response = self.authed(self.client.get(&url))?.send().await?;
        let list: IndexList = http::read_json(response, "index list").await?;
        Ok(list.indexes.into_iter().map(|index| index.name).collect())
    }

    #[instrument(skip(self, config), fields(index = %config.name))]
    async fn create_index(&self, config: &IndexConfig) -> Result<()> {
        let url = self.config.control_url.join("indexes");
        let request = CreateIndexRequest {
            name: &config.name,
            dimension: config.dimension,
            metric: config.metric.as_str(),
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &config.cloud,
                    region: &config.region,
                },
            },
        };

        let response = self
            .authed(self.client.post(&url))?
            .json(&request)
            .send()
            .await?;
        http::read_body(response).await?;
        debug!("Index creation accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn describe_index(&self, name: &str) -> Result<IndexStatus> {
        let url = self.config.control_url.join(&format!("indexes/{}", name));
        let response = self.authed(self.client.get(&url))?.send().await?;
        let model: IndexModel = http::read_json(response, "index description").await?;

        Ok(IndexStatus {
            name: model.name,
            ready: model.status.is_some_and(|status| status.ready),
            host: model.host.filter(|host| !host.is_empty()),
        })
    }

    #[instrument(skip(self, index, vectors), fields(index = %index.name, vectors = vectors.len()))]
    async fn upsert(
        &self,
        index: &IndexStatus,
        namespace: &str,
        vectors: &[Vector],
    ) -> Result<usize> {
        let host = index.host.as_deref().ok_or_else(|| IndexError::MissingHost {
            name: index.name.clone(),
        })?;
        let url = EndpointUrl::from_host(host)?.join("vectors/upsert");

        let response = self
            .authed(self.client.post(&url))?
            .json(&UpsertRequest { vectors, namespace })
            .send()
            .await?;
        let body: UpsertResponse = http::read_json(response, "upsert response").await?;

        Ok(body.upserted_count.unwrap_or(vectors.len()))
    }
}
