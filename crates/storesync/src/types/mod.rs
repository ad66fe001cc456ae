//! Validated value types.

mod endpoint_url;
mod secret;

pub use endpoint_url::EndpointUrl;
pub use secret::ApiKey;
