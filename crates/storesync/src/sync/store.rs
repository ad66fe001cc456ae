//! JSON file persistence for sync snapshots.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::error::StorageError;

use super::snapshot::SyncSnapshot;
use super::types::{Edge, PageInfo};

/// How the initial snapshot of a run was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from the backing file.
    Existing,
    /// No backing file yet.
    Missing,
    /// The backing file was empty.
    Empty,
    /// The backing file could not be read or parsed; started from scratch.
    Recovered { reason: String },
}

/// `{"data": {"<field>": {"edges": [...]}}, "pageInfo": {...}}`
#[derive(Debug, Serialize)]
struct SnapshotFile<'a> {
    data: Map<String, Value>,
    #[serde(rename = "pageInfo")]
    page_info: StoredPageInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StoredPageInfo<'a> {
    Known(&'a PageInfo),
    Empty {},
}

#[derive(Debug, Deserialize)]
struct RawSnapshotFile {
    data: Map<String, Value>,
    #[serde(rename = "pageInfo", default)]
    page_info: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredConnection {
    edges: Vec<Edge>,
}

/// Loads and saves the snapshot of one resource.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    field: String,
}

impl SnapshotStore {
    /// Create a store for `field` backed by the file at `path`.
    pub fn new(path: impl AsRef<Path>, field: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            field: field.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Load the snapshot, falling back to an empty one.
    pub fn load(&self) -> SyncSnapshot {
        self.load_with_source().0
    }

    /// Load the snapshot and report where it came from.
    ///
    /// Never fails: a missing, empty, unreadable or malformed file yields an
    /// empty snapshot.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_with_source(&self) -> (SyncSnapshot, LoadSource) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot file, starting empty");
                return (SyncSnapshot::new(), LoadSource::Missing);
            }
            Err(e) => return self.recover(e.to_string()),
        };

        if content.trim().is_empty() {
            info!("Snapshot file is empty, starting empty");
            return (SyncSnapshot::new(), LoadSource::Empty);
        }

        match self.parse(&content) {
            Ok(snapshot) => {
                debug!(records = snapshot.len(), "Loaded snapshot");
                (snapshot, LoadSource::Existing)
            }
            Err(reason) => self.recover(reason),
        }
    }

    fn recover(&self, reason: String) -> (SyncSnapshot, LoadSource) {
        warn!(%reason, "Snapshot unusable, starting empty");
        (SyncSnapshot::new(), LoadSource::Recovered { reason })
    }

    fn parse(&self, content: &str) -> std::result::Result<SyncSnapshot, String> {
        let mut raw: RawSnapshotFile = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let connection = raw
            .data
            .remove(&self.field)
            .ok_or_else(|| format!("missing data.{}", self.field))?;
        let connection: StoredConnection = serde_json::from_value(connection)
            .map_err(|e| format!("invalid data.{}: {}", self.field, e))?;

        // `{}` and anything else without a usable hasNextPage mean "no page info yet".
        let page_info = serde_json::from_value::<PageInfo>(raw.page_info).ok();

        let stored = connection.edges.len();
        let snapshot = SyncSnapshot::from_parts(connection.edges, page_info);
        if snapshot.len() != stored {
            warn!(
                dropped = stored - snapshot.len(),
                "Snapshot contained duplicate ids, keeping first occurrences"
            );
        }
        Ok(snapshot)
    }

    /// Persist the snapshot, replacing the backing file atomically.
    ///
    /// The JSON is written to a temporary file next to the target, synced,
    /// then renamed over it. The temporary file is removed if any step fails.
    #[instrument(skip(self, snapshot), fields(path = %self.path.display(), records = snapshot.len()))]
    pub fn save(&self, snapshot: &SyncSnapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

        let mut data = Map::new();
        data.insert(
            self.field.clone(),
            serde_json::to_value(StoredConnection {
                edges: snapshot.edges().to_vec(),
            })
            .map_err(StorageError::from)?,
        );
        let file = SnapshotFile {
            data,
            page_info: match snapshot.page_info() {
                Some(page_info) => StoredPageInfo::Known(page_info),
                None => StoredPageInfo::Empty {},
            },
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".storesync-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StorageError::io(dir, e))?;

        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut tmp, formatter);
        file.serialize(&mut serializer).map_err(StorageError::from)?;

        tmp.flush().map_err(|e| StorageError::io(tmp.path(), e))?;
        // The temp file is created owner-only; keep the mode of the file it replaces.
        if let Ok(existing) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| StorageError::io(tmp.path(), e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, e.error))?;

        debug!("Saved snapshot");
        Ok(())
    }
}
