//! Content-derived document identifiers.

use sha2::{Digest, Sha256};

use super::document::Document;

/// Derives stable identifiers from document content.
///
/// Byte-identical content always yields the same identifier; any change,
/// whitespace included, yields a different one.
///
/// # Example
///
/// ```
/// use storesync::ContentHasher;
///
/// let id = ContentHasher::id_for(b"{\"title\": \"Mug\"}");
/// assert!(id.starts_with("doc-"));
/// assert_eq!(id, ContentHasher::id_for(b"{\"title\": \"Mug\"}"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Prefix of every content-derived identifier.
    pub const PREFIX: &'static str = "doc-";

    /// `doc-` followed by the hex SHA-256 of `content`.
    pub fn id_for(content: &[u8]) -> String {
        let digest = Sha256::digest(content);
        format!("{}{}", Self::PREFIX, hex::encode(digest))
    }

    /// Identifier for a document's content.
    pub fn id_for_document(document: &Document) -> String {
        Self::id_for(document.content.as_bytes())
    }
}
