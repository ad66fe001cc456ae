//! Cursor-driven page requests.

use std::num::NonZeroU32;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::Result;

use super::resource::Resource;
use super::types::Page;

/// A remote collection that can be read one page at a time.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch up to `first` records of `resource` following the `after` cursor.
    async fn fetch_page(&self, resource: &Resource, first: u32, after: Option<&str>)
    -> Result<Page>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for &S {
    async fn fetch_page(
        &self,
        resource: &Resource,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page> {
        (**self).fetch_page(resource, first, after).await
    }
}

/// Where a paginator stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorStatus {
    /// More pages may be requested.
    Running,
    /// The source reported no further pages.
    Exhausted,
    /// The page ceiling was reached while more pages remained.
    LimitReached,
    /// A request failed; no further requests are made.
    Failed,
}

/// Requests pages in sequence until the source runs out, a request fails,
/// or the page ceiling is reached.
///
/// There is no retry: the first failure ends pagination.
pub struct Paginator<'a, S: ?Sized> {
    source: &'a S,
    resource: &'a Resource,
    page_size: NonZeroU32,
    cursor: Option<String>,
    max_pages: Option<u32>,
    pages_fetched: u32,
    status: PaginatorStatus,
}

impl<'a, S: PageSource + ?Sized> Paginator<'a, S> {
    /// Create a paginator starting from the first page.
    pub fn new(source: &'a S, resource: &'a Resource, page_size: NonZeroU32) -> Self {
        Self {
            source,
            resource,
            page_size,
            cursor: None,
            max_pages: None,
            pages_fetched: 0,
            status: PaginatorStatus::Running,
        }
    }

    /// Start after the given cursor instead of from the beginning.
    pub fn starting_after(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Stop after `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once pagination has ended. A failed request is returned
    /// once and then pagination ends.
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        if self.status != PaginatorStatus::Running {
            return None;
        }

        if self.max_pages.is_some_and(|max| self.pages_fetched >= max) {
            warn!(
                resource = %self.resource.field,
                pages = self.pages_fetched,
                "Page limit reached, stopping"
            );
            self.status = PaginatorStatus::LimitReached;
            return None;
        }

        debug!(
            resource = %self.resource.field,
            first = self.page_size.get(),
            after = ?self.cursor,
            "Requesting page"
        );

        let page = match self
            .source
            .fetch_page(self.resource, self.page_size.get(), self.cursor.as_deref())
            .await
        {
            Ok(page) => page,
            Err(err) => {
                self.status = PaginatorStatus::Failed;
                return Some(Err(err));
            }
        };

        self.pages_fetched += 1;

        if page.page_info.has_next_page {
            match &page.page_info.end_cursor {
                Some(cursor) => self.cursor = Some(cursor.clone()),
                None => {
                    warn!(
                        resource = %self.resource.field,
                        "hasNextPage without endCursor, stopping"
                    );
                    self.status = PaginatorStatus::Exhausted;
                }
            }
        } else {
            self.status = PaginatorStatus::Exhausted;
        }

        Some(Ok(page))
    }

    pub fn status(&self) -> PaginatorStatus {
        self.status
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// The cursor the next request would use.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}
