//! Error types for the storesync library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, decoding, storage, vector index and input
//! validation errors.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for storesync operations.
///
/// Sync runs do not propagate fetch failures through this type; they are
/// reported inside [`SyncOutcome::Aborted`](crate::SyncOutcome::Aborted).
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success HTTP responses.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Response bodies that do not match the expected structure.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// GraphQL-level errors reported by the server.
    #[error("graphql error: {0}")]
    Graphql(#[from] GraphqlError),

    /// Filesystem errors while reading or persisting files.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Vector index and embedding contract violations.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Input validation errors (invalid URL, config value, document).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// A non-success HTTP response.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body, kept for diagnosis.
    pub body: String,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.body.is_empty() {
            write!(f, ": {}", self.body)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Longest raw response prefix shown when a [`DecodeError`] is displayed.
const RAW_EXCERPT_LEN: usize = 512;

/// A response body that failed to decode.
#[derive(Debug)]
pub struct DecodeError {
    /// What was being decoded.
    pub what: &'static str,
    /// Parser message.
    pub message: String,
    /// The raw response text.
    pub raw: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode {}: {}", self.what, self.message)?;
        if self.raw.is_empty() {
            return write!(f, "; empty response");
        }
        write!(f, "; raw response: {}", self.excerpt())?;
        if self.excerpt().len() < self.raw.len() {
            write!(f, "... ({} bytes)", self.raw.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    pub(crate) fn new(what: &'static str, err: impl fmt::Display, raw: impl Into<String>) -> Self {
        Self {
            what,
            message: err.to_string(),
            raw: raw.into(),
        }
    }

    /// The start of the raw response, cut at a character boundary.
    pub fn excerpt(&self) -> &str {
        if self.raw.len() <= RAW_EXCERPT_LEN {
            return &self.raw;
        }
        let mut end = RAW_EXCERPT_LEN;
        while !self.raw.is_char_boundary(end) {
            end -= 1;
        }
        &self.raw[..end]
    }
}

/// Errors listed in a GraphQL `errors` array.
#[derive(Debug, Error)]
#[error("{}", .messages.join("; "))]
pub struct GraphqlError {
    /// The `message` of each reported error.
    pub messages: Vec<String>,
}

/// Filesystem failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error at the given path.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization of the snapshot failed.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Vector index and embedding errors.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedder returned a different number of vectors than inputs.
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCount { expected: usize, actual: usize },

    /// An embedding does not match the index dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// The index description did not include a data plane host.
    #[error("index '{name}' has no host")]
    MissingHost { name: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid endpoint URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid configuration value.
    #[error("invalid config '{field}': {reason}")]
    Config { field: &'static str, reason: String },

    /// Invalid document input.
    #[error("invalid document: {message}")]
    Document { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display_includes_body() {
        let err = ProtocolError::new(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert!(!err.is_auth_error());
        assert!(ProtocolError::new(401, "").is_auth_error());
    }

    #[test]
    fn graphql_error_joins_messages() {
        let err = GraphqlError {
            messages: vec!["Throttled".to_string(), "Access denied".to_string()],
        };
        assert_eq!(err.to_string(), "Throttled; Access denied");
    }

    #[test]
    fn decode_error_display_includes_raw_response() {
        let err = DecodeError::new("page", "expected value", "<html>maintenance</html>");
        assert_eq!(
            err.to_string(),
            "failed to decode page: expected value; raw response: <html>maintenance</html>"
        );
        assert_eq!(
            DecodeError::new("page", "EOF", "").to_string(),
            "failed to decode page: EOF; empty response"
        );
    }

    #[test]
    fn decode_error_truncates_long_raw_response() {
        let raw = "é".repeat(400);
        let err = DecodeError::new("page", "expected value", raw.clone());

        assert!(err.excerpt().len() <= RAW_EXCERPT_LEN);
        assert!(raw.starts_with(err.excerpt()));
        assert!(err.to_string().ends_with("... (800 bytes)"));
    }
}
