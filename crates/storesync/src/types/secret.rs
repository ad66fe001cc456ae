//! Secret value types for API authentication.

use std::fmt;

/// An API key or access token sent in request headers.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key value for use in request headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP headers.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

// Hide key value in Debug output
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_hides_value_in_debug() {
        let key = ApiKey::new("shpat_0123456789abcdef");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("shpat_"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn api_key_exposes_value_for_headers() {
        let key = ApiKey::new("sk-test");
        assert_eq!(key.expose(), "sk-test");
    }
}
