//! GraphQL request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body: `{query, variables}`.
#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: &'a V,
}

/// Variables of a paginated connection query.
///
/// `after` is always sent, as `null` for the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVariables<'a> {
    pub first: u32,
    pub after: Option<&'a str>,
}

/// Response envelope: `{data, errors}`.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

/// One entry of the `errors` array.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlErrorEntry {
    pub message: String,
}
