//! Status command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use storesync::SnapshotStore;
use storesync::sync::LoadSource;

use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Resource whose snapshot to inspect (customers, orders, products)
    pub resource: String,

    /// Snapshot file (defaults to the resource's file in the current directory)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
    resource: &'a str,
    file: String,
    source: &'static str,
    records: usize,
    has_next_page: Option<bool>,
    end_cursor: Option<&'a str>,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let resource = super::resource(&args.resource, args.file.as_deref())?;
    let store = SnapshotStore::new(&resource.snapshot_path, resource.field.clone());
    let (snapshot, source) = store.load_with_source();

    let status = Status {
        resource: &resource.field,
        file: resource.snapshot_path.display().to_string(),
        source: match &source {
            LoadSource::Existing => "existing",
            LoadSource::Missing => "missing",
            LoadSource::Empty => "empty",
            LoadSource::Recovered { .. } => "unreadable",
        },
        records: snapshot.len(),
        has_next_page: snapshot.page_info().map(|info| info.has_next_page),
        end_cursor: snapshot.end_cursor(),
    };

    if args.json {
        return output::json(&status);
    }

    output::field("Resource", status.resource);
    output::field("File", &status.file);
    match &source {
        LoadSource::Recovered { reason } => {
            output::warning(&format!("Snapshot is unreadable: {}", reason))
        }
        _ => output::field("State", status.source),
    }
    output::field("Records", &status.records.to_string());
    if let Some(has_next_page) = status.has_next_page {
        output::field("Has next page", &has_next_page.to_string());
    }
    if let Some(cursor) = status.end_cursor {
        output::field("End cursor", cursor);
    }

    Ok(())
}
