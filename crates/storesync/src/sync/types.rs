//! Connection types shared by the wire format and the snapshot file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pagination metadata for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether more pages follow this one.
    pub has_next_page: bool,
    /// Cursor to request the next page with.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Page info for the final page.
    pub fn last(end_cursor: Option<String>) -> Self {
        Self {
            has_next_page: false,
            end_cursor,
        }
    }

    /// Page info for a page with more to follow.
    pub fn more(end_cursor: impl Into<String>) -> Self {
        Self {
            has_next_page: true,
            end_cursor: Some(end_cursor.into()),
        }
    }
}

/// A resource node. Only `id` is interpreted; every other field is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// One record of a connection: a node and its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub cursor: Option<String>,
    pub node: Node,
}

impl Edge {
    pub fn new(node: Node) -> Self {
        Self { cursor: None, node }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// The record identifier.
    pub fn id(&self) -> &str {
        &self.node.id
    }
}

/// A single fetched page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub edges: Vec<Edge>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}
