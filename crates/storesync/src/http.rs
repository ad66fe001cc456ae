//! Shared HTTP plumbing for the remote services.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::Result;
use crate::error::{DecodeError, ProtocolError, TransportError};

/// Build the HTTP client used by every remote service.
pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("storesync/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::from(e).into())
}

/// Read the body of a response, failing on non-success status.
pub(crate) async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    trace!(status = %status, "HTTP response");

    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ProtocolError::new(status.as_u16(), body).into())
    }
}

/// Read and decode a JSON response body.
pub(crate) async fn read_json<R: DeserializeOwned>(
    response: Response,
    what: &'static str,
) -> Result<R> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| DecodeError::new(what, e, body).into())
}
