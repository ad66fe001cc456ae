//! Sync runs: load, paginate, merge, persist.

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::{StartPosition, SyncOptions};
use crate::error::Error;

use super::paginator::{PageSource, Paginator, PaginatorStatus};
use super::resource::Resource;
use super::snapshot::SyncSnapshot;
use super::store::SnapshotStore;
use super::types::PageInfo;

/// How a sync run ended.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The source reported no further pages.
    Completed,
    /// The page ceiling stopped the run with pages remaining.
    PageLimitReached,
    /// A page request failed. Progress up to the failure was persisted.
    Aborted(Error),
}

impl SyncOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed)
    }
}

/// Summary of one sync run.
#[derive(Debug)]
pub struct SyncReport {
    /// The connection field that was synchronized.
    pub resource: String,
    pub pages_fetched: u32,
    /// Records appended to the snapshot by this run.
    pub records_added: usize,
    /// Records dropped because their id was already stored.
    pub records_skipped: usize,
    /// Records in the persisted snapshot.
    pub total_records: usize,
    /// Page info persisted with the snapshot.
    pub page_info: Option<PageInfo>,
    pub outcome: SyncOutcome,
}

/// Synchronizes resources from a [`PageSource`] into snapshot files.
pub struct SyncEngine<S> {
    source: S,
    options: SyncOptions,
}

impl<S: PageSource> SyncEngine<S> {
    pub fn new(source: S, options: SyncOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Sync `resource` into its configured snapshot file.
    pub async fn run(&self, resource: &Resource) -> Result<SyncReport> {
        let store = SnapshotStore::new(&resource.snapshot_path, resource.field.clone());
        self.run_with_store(resource, &store).await
    }

    /// Sync `resource` into the given store.
    ///
    /// Fetch failures end the run early and are reported in
    /// [`SyncReport::outcome`]; the snapshot is persisted either way. Only a
    /// failure to persist is returned as an error.
    #[instrument(skip(self, resource, store), fields(resource = %resource.field))]
    pub async fn run_with_store(
        &self,
        resource: &Resource,
        store: &SnapshotStore,
    ) -> Result<SyncReport> {
        let mut snapshot = store.load();
        let start = self.start_cursor(&snapshot);

        info!(
            stored = snapshot.len(),
            after = ?start,
            "Starting sync"
        );

        let mut paginator = Paginator::new(&self.source, resource, self.options.page_size)
            .starting_after(start)
            .with_max_pages(self.options.max_pages);

        let mut records_added = 0;
        let mut records_skipped = 0;
        let mut failure = None;

        while let Some(result) = paginator.next_page().await {
            match result {
                Ok(page) => {
                    let stats = snapshot.merge_page(page);
                    records_added += stats.added;
                    records_skipped += stats.skipped;
                    info!(
                        page = paginator.pages_fetched(),
                        added = stats.added,
                        skipped = stats.skipped,
                        total = snapshot.len(),
                        "Merged page"
                    );
                }
                Err(err) => {
                    warn!(error = %err, "Page request failed, stopping sync");
                    if let Error::Decode(decode) = &err {
                        debug!(raw = %decode.raw, "Undecodable response");
                    }
                    failure = Some(err);
                }
            }
        }

        store.save(&snapshot)?;

        let outcome = match (failure, paginator.status()) {
            (Some(err), _) => SyncOutcome::Aborted(err),
            (None, PaginatorStatus::LimitReached) => SyncOutcome::PageLimitReached,
            (None, _) => SyncOutcome::Completed,
        };

        info!(
            pages = paginator.pages_fetched(),
            added = records_added,
            total = snapshot.len(),
            completed = outcome.is_completed(),
            "Sync finished"
        );

        Ok(SyncReport {
            resource: resource.field.clone(),
            pages_fetched: paginator.pages_fetched(),
            records_added,
            records_skipped,
            total_records: snapshot.len(),
            page_info: snapshot.page_info().cloned(),
            outcome,
        })
    }

    fn start_cursor(&self, snapshot: &SyncSnapshot) -> Option<String> {
        match &self.options.start {
            StartPosition::Beginning => None,
            StartPosition::After(cursor) => Some(cursor.clone()),
            StartPosition::Resume => snapshot.end_cursor().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::sync::paginator::testing::ScriptedSource;
    use crate::sync::types::{Edge, Node, Page};

    fn page(ids: std::ops::Range<u32>, page_info: PageInfo) -> Page {
        Page {
            edges: ids
                .map(|i| Edge::new(Node::new(format!("gid://shopify/Product/{i}"))).with_cursor(format!("c{i}")))
                .collect(),
            page_info,
        }
    }

    fn store(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("products.json"), "products")
    }

    #[tokio::test]
    async fn two_pages_into_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let source = ScriptedSource::new(vec![
            Ok(page(0..100, PageInfo::more("c99"))),
            Ok(page(100..150, PageInfo::last(Some("c149".into())))),
        ]);
        let engine = SyncEngine::new(&source, SyncOptions::default());

        let report = engine
            .run_with_store(&Resource::products(), &store)
            .await
            .unwrap();

        assert!(report.outcome.is_completed());
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.records_added, 150);
        let snapshot = store.load();
        assert_eq!(snapshot.len(), 150);
        assert!(!snapshot.page_info().unwrap().has_next_page);
    }

    #[tokio::test]
    async fn failure_keeps_partial_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let source = ScriptedSource::new(vec![
            Ok(page(0..100, PageInfo::more("c99"))),
            Err(Error::Protocol(ProtocolError::new(502, "Bad Gateway"))),
        ]);
        let engine = SyncEngine::new(&source, SyncOptions::default());

        let report = engine
            .run_with_store(&Resource::products(), &store)
            .await
            .unwrap();

        assert!(matches!(report.outcome, SyncOutcome::Aborted(Error::Protocol(_))));
        let snapshot = store.load();
        assert_eq!(snapshot.len(), 100);
        assert_eq!(snapshot.page_info(), Some(&PageInfo::more("c99")));
    }

    #[tokio::test]
    async fn resume_starts_from_stored_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store
            .save(&SyncSnapshot::from_parts(
                page(0..100, PageInfo::more("c99")).edges,
                Some(PageInfo::more("c99")),
            ))
            .unwrap();

        let source = ScriptedSource::new(vec![Ok(page(100..150, PageInfo::last(Some("c149".into()))))]);
        let options = SyncOptions::default().with_start(StartPosition::Resume);
        let engine = SyncEngine::new(&source, options);

        let report = engine
            .run_with_store(&Resource::products(), &store)
            .await
            .unwrap();

        assert_eq!(source.cursors(), vec![Some("c99".to_string())]);
        assert_eq!(report.records_added, 50);
        assert_eq!(report.records_skipped, 0);
        assert_eq!(store.load().len(), 150);
    }

    #[tokio::test]
    async fn page_limit_is_reported_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let source = ScriptedSource::new(vec![
            Ok(page(0..10, PageInfo::more("c9"))),
            Ok(page(10..20, PageInfo::more("c19"))),
        ]);
        let options = SyncOptions::default().with_max_pages(Some(1));
        let engine = SyncEngine::new(&source, options);

        let report = engine
            .run_with_store(&Resource::products(), &store)
            .await
            .unwrap();

        assert!(matches!(report.outcome, SyncOutcome::PageLimitReached));
        assert_eq!(report.total_records, 10);
        assert_eq!(store.load().end_cursor(), Some("c9"));
    }
}
