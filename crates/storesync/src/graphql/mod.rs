//! GraphQL client implementation.
//!
//! This module provides the HTTP client for the paginated GraphQL endpoint.

mod client;
mod types;

pub use client::GraphqlClient;
pub use types::PageVariables;
