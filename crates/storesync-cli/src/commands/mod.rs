//! Subcommand implementations.

pub mod status;
pub mod sync;
pub mod upsert;

use anyhow::{Result, bail};
use storesync::Resource;

/// Resolve a preset resource, optionally storing its snapshot elsewhere.
pub(crate) fn resource(name: &str, file: Option<&std::path::Path>) -> Result<Resource> {
    let Some(resource) = Resource::preset(name) else {
        bail!(
            "Unknown resource '{}'. Expected one of: {}",
            name,
            Resource::PRESETS.join(", ")
        );
    };
    Ok(match file {
        Some(file) => resource.with_snapshot_path(file),
        None => resource,
    })
}
