//! GraphQL HTTP client implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace, warn};

use crate::Result;
use crate::config::ShopConfig;
use crate::error::{DecodeError, GraphqlError, InvalidInputError};
use crate::http;
use crate::sync::{Page, PageSource, Resource};
use crate::types::ApiKey;

use super::types::{GraphqlRequest, GraphqlResponse, PageVariables};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";
const APP_SECRET_HEADER: &str = "x-shopify-app-secret";

/// HTTP client for GraphQL requests.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: reqwest::Client,
    config: ShopConfig,
}

impl GraphqlClient {
    /// Create a new GraphQL client for the given shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: ShopConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            config,
        })
    }

    /// Returns the shop configuration this client uses.
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Execute a query and decode its `data` member.
    ///
    /// A response with `errors` and no `data` is a [`GraphqlError`]. When
    /// partial data comes with errors, the errors are logged and the data
    /// is returned.
    #[instrument(skip(self, query), fields(endpoint = %self.config.endpoint))]
    pub async fn execute<V, R>(&self, query: &str, variables: &V) -> Result<R>
    where
        V: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        debug!("GraphQL request");
        trace!(?variables, "query variables");

        let response = self
            .client
            .post(self.config.endpoint.as_str())
            .headers(self.auth_headers()?)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let body = http::read_body(response).await?;
        let envelope: GraphqlResponse = serde_json::from_str(&body)
            .map_err(|e| DecodeError::new("GraphQL response", e, body.clone()))?;

        let messages: Vec<String> = envelope
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.message)
            .collect();

        let data = match envelope.data {
            Some(Value::Null) | None if !messages.is_empty() => {
                return Err(GraphqlError { messages }.into());
            }
            Some(Value::Null) | None => {
                return Err(
                    DecodeError::new("GraphQL response", "missing `data`", body).into(),
                );
            }
            Some(data) => data,
        };
        if !messages.is_empty() {
            warn!(?messages, "GraphQL errors alongside data, continuing");
        }

        serde_json::from_value(data).map_err(|e| DecodeError::new("GraphQL data", e, body).into())
    }

    /// Create the authentication headers for the shop.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
            header_value("access_token", &self.config.access_token)?,
        );
        if let Some(secret) = &self.config.app_secret {
            headers.insert(
                HeaderName::from_static(APP_SECRET_HEADER),
                header_value("app_secret", secret)?,
            );
        }
        Ok(headers)
    }
}

fn header_value(field: &'static str, key: &ApiKey) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(key.expose()).map_err(|_| InvalidInputError::Config {
        field,
        reason: "contains characters not allowed in an HTTP header".to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl PageSource for GraphqlClient {
    async fn fetch_page(
        &self,
        resource: &Resource,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page> {
        let variables = PageVariables { first, after };
        let mut data: Map<String, Value> = self.execute(&resource.query, &variables).await?;

        let connection = match data.remove(&resource.field) {
            Some(Value::Null) | None => {
                return Err(DecodeError::new(
                    "page",
                    format!("missing data.{}", resource.field),
                    Value::Object(data).to_string(),
                )
                .into());
            }
            Some(connection) => connection,
        };

        serde_json::from_value::<Page>(connection.clone())
            .map_err(|e| DecodeError::new("page", e, connection.to_string()).into())
    }
}
