//! Explicit configuration passed to each component at construction.

use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};
use crate::index::IdPolicy;
use crate::types::{ApiKey, EndpointUrl};

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default vector dimension, matching `text-embedding-ada-002`.
pub const DEFAULT_DIMENSION: usize = 1536;

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Connection settings for the paginated GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// The GraphQL endpoint (e.g. `https://<shop>/admin/api/2024-10/graphql.json`).
    pub endpoint: EndpointUrl,
    /// Sent as `X-Shopify-Access-Token`.
    pub access_token: ApiKey,
    /// Sent as `X-Shopify-App-Secret` when present.
    pub app_secret: Option<ApiKey>,
}

impl ShopConfig {
    /// Create a config for the given endpoint and access token.
    pub fn new(endpoint: impl AsRef<str>, access_token: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            endpoint: EndpointUrl::new(endpoint)?,
            access_token: ApiKey::new(access_token),
            app_secret: None,
        })
    }

    /// Attach an application secret header.
    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(ApiKey::new(secret));
        self
    }
}

/// Where a sync run starts paginating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// Request the first page with no cursor.
    #[default]
    Beginning,
    /// Start after an explicit cursor.
    After(String),
    /// Start after the `endCursor` stored in the snapshot, if any.
    Resume,
}

/// Options controlling a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Records requested per page (`first`).
    pub page_size: NonZeroU32,
    /// Upper bound on pages fetched per run. `None` means unbounded.
    pub max_pages: Option<u32>,
    /// Starting cursor policy.
    pub start: StartPosition,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
            max_pages: None,
            start: StartPosition::Beginning,
        }
    }
}

impl SyncOptions {
    /// Set the page size.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_size` is zero.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, Error> {
        self.page_size = NonZeroU32::new(page_size).ok_or(InvalidInputError::Config {
            field: "page_size",
            reason: "must be a positive integer".to_string(),
        })?;
        Ok(self)
    }

    /// Set the page ceiling.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the start position.
    pub fn with_start(mut self, start: StartPosition) -> Self {
        self.start = start;
        self
    }
}

/// Similarity metric of a vector index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            "dotproduct" => Ok(Metric::Dotproduct),
            other => Err(InvalidInputError::Config {
                field: "metric",
                reason: format!("unknown metric '{}'", other),
            }
            .into()),
        }
    }
}

/// Target index settings for document upserts.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Index name.
    pub name: String,
    /// Namespace within the index.
    pub namespace: String,
    /// Vector dimension used when the index has to be created.
    pub dimension: usize,
    /// Similarity metric used when the index has to be created.
    pub metric: Metric,
    /// Serverless cloud placement.
    pub cloud: String,
    /// Serverless region placement.
    pub region: String,
    /// Delay between readiness polls after creating the index.
    pub poll_interval: Duration,
    /// Maximum vectors per upsert request.
    pub batch_size: NonZeroUsize,
    /// How document identifiers are assigned.
    pub id_policy: IdPolicy,
}

impl IndexConfig {
    /// Create an index config with default placement and policy.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            dimension: DEFAULT_DIMENSION,
            metric: Metric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            poll_interval: Duration::from_secs(1),
            batch_size: NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN),
            id_policy: IdPolicy::ContentAddressed,
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_placement(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }
}

/// Settings for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// API base, e.g. `https://api.openai.com/v1`.
    pub base_url: EndpointUrl,
    /// Bearer token.
    pub api_key: ApiKey,
    /// Embedding model name.
    pub model: String,
}

impl EmbeddingConfig {
    /// Settings for the public OpenAI API with the default model.
    pub fn openai(api_key: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            base_url: EndpointUrl::new("https://api.openai.com/v1")?,
            api_key: ApiKey::new(api_key),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: EndpointUrl) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Settings for a Pinecone-compatible vector index service.
#[derive(Debug, Clone)]
pub struct VectorServiceConfig {
    /// Control plane base, e.g. `https://api.pinecone.io`.
    pub control_url: EndpointUrl,
    /// Sent as `Api-Key`.
    pub api_key: ApiKey,
}

impl VectorServiceConfig {
    /// Settings for the public Pinecone control plane.
    pub fn pinecone(api_key: impl Into<String>) -> Result<Self, Error> {
        Ok(Self {
            control_url: EndpointUrl::new("https://api.pinecone.io")?,
            api_key: ApiKey::new(api_key),
        })
    }

    pub fn with_control_url(mut self, control_url: EndpointUrl) -> Self {
        self.control_url = control_url;
        self
    }
}
