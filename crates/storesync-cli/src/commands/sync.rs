//! Sync command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use storesync::{GraphqlClient, ShopConfig, StartPosition, SyncEngine, SyncOptions, SyncOutcome};

use crate::output;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Resource to sync (customers, orders, products)
    pub resource: String,

    /// Snapshot file (defaults to the resource's file in the current directory)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, env = "SHOPIFY_GRAPHQL_URL")]
    pub endpoint: String,

    /// Shop access token
    #[arg(long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Shop app secret
    #[arg(long, env = "SHOPIFY_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Records requested per page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Stop after this many pages
    #[arg(long, default_value_t = 10_000)]
    pub max_pages: u32,

    /// Continue from the end cursor stored in the snapshot
    #[arg(long, conflicts_with = "after")]
    pub resume: bool,

    /// Start after this cursor
    #[arg(long)]
    pub after: Option<String>,
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let resource = super::resource(&args.resource, args.file.as_deref())?;

    let mut shop =
        ShopConfig::new(&args.endpoint, &args.access_token).context("Invalid shop configuration")?;
    if let Some(secret) = &args.app_secret {
        shop = shop.with_app_secret(secret);
    }

    let start = match (args.resume, args.after) {
        (true, _) => StartPosition::Resume,
        (false, Some(cursor)) => StartPosition::After(cursor),
        (false, None) => StartPosition::Beginning,
    };
    let options = SyncOptions::default()
        .with_page_size(args.page_size)
        .context("Invalid page size")?
        .with_max_pages(Some(args.max_pages))
        .with_start(start);

    debug!(
        endpoint = %shop.endpoint,
        file = %resource.snapshot_path.display(),
        ?options,
        "Resolved sync configuration"
    );

    let client = GraphqlClient::new(shop).context("Failed to build HTTP client")?;
    let engine = SyncEngine::new(client, options);

    eprintln!(
        "{}",
        format!(
            "Syncing {} into {}...",
            resource.field,
            resource.snapshot_path.display()
        )
        .dimmed()
    );

    let report = engine
        .run(&resource)
        .await
        .context("Failed to save snapshot")?;

    match &report.outcome {
        SyncOutcome::Completed => output::success("Sync complete"),
        SyncOutcome::PageLimitReached => output::warning(&format!(
            "Stopped after {} pages with more remaining",
            report.pages_fetched
        )),
        SyncOutcome::Aborted(err) => output::error(&format!("Sync stopped early: {}", err)),
    }
    println!();
    output::field("Resource", &report.resource);
    output::field("Pages", &report.pages_fetched.to_string());
    output::field("Added", &report.records_added.to_string());
    output::field("Skipped", &report.records_skipped.to_string());
    output::field("Total", &report.total_records.to_string());
    if let Some(page_info) = &report.page_info {
        output::field("Has next page", &page_info.has_next_page.to_string());
        output::field(
            "End cursor",
            page_info.end_cursor.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
