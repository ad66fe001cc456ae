//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{status, sync, upsert};

/// Mirror paginated shop resources into JSON snapshots and load them into a
/// vector index.
#[derive(Parser, Debug)]
#[command(name = "storesync")]
#[command(author, version = env!("STORESYNC_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a resource page by page and merge it into its snapshot file
    Sync(sync::SyncArgs),

    /// Show what a snapshot file currently holds
    Status(status::StatusArgs),

    /// Embed a JSON file and upsert it into a vector index
    Upsert(upsert::UpsertArgs),
}
