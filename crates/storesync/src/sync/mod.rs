//! Incremental cursor-paginated synchronization.
//!
//! A [`SyncEngine`] drives a [`Paginator`] over a [`PageSource`], folds every
//! page into a [`SyncSnapshot`] (first write wins, no duplicate ids), and
//! persists the result through a [`SnapshotStore`] at the end of each run,
//! including runs that stopped early.

mod engine;
mod paginator;
mod resource;
mod snapshot;
mod store;
mod types;

pub use engine::{SyncEngine, SyncOutcome, SyncReport};
pub use paginator::{PageSource, Paginator, PaginatorStatus};
pub use resource::Resource;
pub use snapshot::{MergeStats, SyncSnapshot};
pub use store::{LoadSource, SnapshotStore};
pub use types::{Edge, Node, Page, PageInfo};
