//! In-memory sync snapshot and the first-write-wins merge.

use std::collections::HashSet;

use super::types::{Edge, Page, PageInfo};

/// Counts from folding one page into a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records appended to the snapshot.
    pub added: usize,
    /// Records dropped because their id was already present.
    pub skipped: usize,
}

/// The accumulated records of a resource plus the latest page info.
///
/// Records keep first-seen order across runs and no two records share an
/// `id`. A record that is seen again is never replaced, even if its payload
/// changed upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSnapshot {
    edges: Vec<Edge>,
    ids: HashSet<String>,
    page_info: Option<PageInfo>,
}

impl SyncSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from stored records, keeping the first occurrence
    /// of each id.
    pub fn from_parts(edges: impl IntoIterator<Item = Edge>, page_info: Option<PageInfo>) -> Self {
        let mut snapshot = Self {
            page_info,
            ..Self::default()
        };
        for edge in edges {
            snapshot.insert(edge);
        }
        snapshot
    }

    /// Append a record unless its id is already present.
    ///
    /// Returns `true` if the record was appended.
    pub fn insert(&mut self, edge: Edge) -> bool {
        if self.ids.contains(edge.id()) {
            return false;
        }
        self.ids.insert(edge.id().to_string());
        self.edges.push(edge);
        true
    }

    /// Fold a page into the snapshot.
    ///
    /// The page info is replaced by the page's page info regardless of how
    /// many records were new.
    pub fn merge_page(&mut self, page: Page) -> MergeStats {
        let mut stats = MergeStats::default();
        for edge in page.edges {
            if self.insert(edge) {
                stats.added += 1;
            } else {
                stats.skipped += 1;
            }
        }
        self.page_info = Some(page.page_info);
        stats
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    pub fn get(&self, id: &str) -> Option<&Edge> {
        if !self.ids.contains(id) {
            return None;
        }
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Page info of the most recently merged page, if any.
    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    /// The stored `endCursor`, used to resume pagination.
    pub fn end_cursor(&self) -> Option<&str> {
        self.page_info.as_ref()?.end_cursor.as_deref()
    }
}
