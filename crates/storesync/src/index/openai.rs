//! OpenAI-compatible embeddings client.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Result;
use crate::config::EmbeddingConfig;
use crate::error::{IndexError, InvalidInputError};
use crate::http;

use super::Embedder;

/// Most inputs sent in one embeddings request. The service rejects requests
/// above 2048 inputs.
pub const MAX_INPUTS_PER_REQUEST: usize = 1000;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embeds text through a `POST /embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            config,
        })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    fn bearer(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key.expose()))
            .map_err(|_| InvalidInputError::Config {
                field: "api_key",
                reason: "contains characters not allowed in an HTTP header".to_string(),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// One `POST /embeddings` for at most [`MAX_INPUTS_PER_REQUEST`] inputs.
    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(inputs = inputs.len(), "Requesting embeddings");
        let response = self
            .client
            .post(self.config.base_url.join("embeddings"))
            .header(AUTHORIZATION, self.bearer()?)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: inputs,
            })
            .send()
            .await?;

        let mut body: EmbeddingResponse = http::read_json(response, "embeddings response").await?;
        if body.data.len() != inputs.len() {
            return Err(IndexError::EmbeddingCount {
                expected: inputs.len(),
                actual: body.data.len(),
            }
            .into());
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    #[instrument(skip(self, inputs), fields(model = %self.config.model, inputs = inputs.len()))]
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(inputs.len());
        for chunk in inputs.chunks(MAX_INPUTS_PER_REQUEST) {
            embeddings.extend(self.request(chunk).await?);
        }
        Ok(embeddings)
    }
}
