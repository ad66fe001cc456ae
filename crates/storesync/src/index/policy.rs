//! Identifier assignment policies.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, InvalidInputError};

use super::document::Document;
use super::hasher::ContentHasher;

/// How documents are identified when upserted.
///
/// The two policies give different guarantees and are deliberately kept
/// apart:
///
/// - [`IdPolicy::ContentAddressed`] derives ids from content, so re-running
///   an upsert over unchanged documents replaces the same vectors.
/// - [`IdPolicy::Ephemeral`] assigns a fresh random id on every run, so
///   re-running an upsert adds duplicate vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    #[default]
    ContentAddressed,
    Ephemeral,
}

impl IdPolicy {
    /// Whether repeated upserts of unchanged content are idempotent.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, IdPolicy::ContentAddressed)
    }

    /// Compute an id for `document` and store it in `metadata.id`.
    pub fn assign(&self, document: &mut Document) -> String {
        let id = match self {
            IdPolicy::ContentAddressed => ContentHasher::id_for_document(document),
            IdPolicy::Ephemeral => Uuid::new_v4().to_string(),
        };
        document
            .metadata
            .insert("id".to_string(), Value::String(id.clone()));
        id
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdPolicy::ContentAddressed => "content",
            IdPolicy::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" | "content-addressed" => Ok(IdPolicy::ContentAddressed),
            "ephemeral" => Ok(IdPolicy::Ephemeral),
            other => Err(InvalidInputError::Config {
                field: "id_policy",
                reason: format!("unknown policy '{}'", other),
            }
            .into()),
        }
    }
}
