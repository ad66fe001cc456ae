//! Upsert command implementation.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use tracing::{debug, warn};

use storesync::config::{DEFAULT_DIMENSION, DEFAULT_EMBEDDING_MODEL};
use storesync::{
    EmbeddingConfig, EndpointUrl, IdPolicy, IndexConfig, IndexUpserter, LoadMode, Metric,
    OpenAiEmbedder, PineconeIndex, VectorServiceConfig, load_documents,
};

use crate::output;

/// How the input file is split into documents.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The whole file is one document
    Whole,
    /// One document per record node
    PerRecord,
}

#[derive(Args, Debug)]
pub struct UpsertArgs {
    /// JSON file to load
    pub file: PathBuf,

    /// Index name
    #[arg(long, default_value = "rag-index")]
    pub index: String,

    /// Namespace within the index
    #[arg(long, default_value = "product")]
    pub namespace: String,

    /// Identifier policy (content, ephemeral)
    #[arg(long, default_value = "content")]
    pub ids: IdPolicy,

    /// How to split the file into documents
    #[arg(long, value_enum, default_value_t = Mode::Whole)]
    pub mode: Mode,

    /// Connection field holding the records, for --mode per-record
    #[arg(long, default_value = "products")]
    pub field: String,

    /// Embedding dimension of the index
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    pub dimension: usize,

    /// Similarity metric used when creating the index
    #[arg(long, default_value = "cosine")]
    pub metric: Metric,

    /// Cloud used when creating the index
    #[arg(long, env = "PINECONE_CLOUD", default_value = "aws")]
    pub cloud: String,

    /// Region used when creating the index
    #[arg(long, env = "PINECONE_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Vectors per upsert request
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Seconds between index readiness checks
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_secs: u64,

    /// Embedding model
    #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
    pub model: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Pinecone API key
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pub pinecone_api_key: String,

    /// Embeddings API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_url: Option<String>,

    /// Vector index control plane URL
    #[arg(long, env = "PINECONE_CONTROL_URL")]
    pub pinecone_url: Option<String>,
}

pub async fn run(args: UpsertArgs) -> Result<()> {
    let mode = match args.mode {
        Mode::Whole => LoadMode::Whole,
        Mode::PerRecord => LoadMode::PerRecord {
            field: args.field.clone(),
        },
    };
    let documents = load_documents(&args.file, &mode)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let mut embedding = EmbeddingConfig::openai(&args.openai_api_key)?.with_model(&args.model);
    if let Some(url) = &args.openai_url {
        embedding = embedding.with_base_url(EndpointUrl::new(url).context("Invalid embeddings URL")?);
    }
    let mut service = VectorServiceConfig::pinecone(&args.pinecone_api_key)?;
    if let Some(url) = &args.pinecone_url {
        service =
            service.with_control_url(EndpointUrl::new(url).context("Invalid control plane URL")?);
    }

    let batch_size = NonZeroUsize::new(args.batch_size).context("--batch-size must be at least 1")?;
    let config = IndexConfig::new(&args.index, &args.namespace)
        .with_dimension(args.dimension)
        .with_metric(args.metric)
        .with_placement(&args.cloud, &args.region)
        .with_batch_size(batch_size)
        .with_poll_interval(Duration::from_secs(args.poll_secs))
        .with_id_policy(args.ids);

    debug!(?config, documents = documents.len(), "Resolved index configuration");

    let embedder = OpenAiEmbedder::new(embedding).context("Failed to build HTTP client")?;
    let index = PineconeIndex::new(service).context("Failed to build HTTP client")?;
    let upserter = IndexUpserter::new(embedder, index, config);

    eprintln!(
        "{}",
        format!(
            "Upserting {} documents into {}/{}...",
            documents.len(),
            args.index,
            args.namespace
        )
        .dimmed()
    );

    let report = upserter
        .upsert(documents)
        .await
        .context("Failed to upsert documents")?;

    if report.index_created {
        output::success(&format!("Created index {}", args.index));
    }
    output::success(&format!("Upserted {} vectors", report.upserted));
    if report.duplicates > 0 {
        output::warning(&format!(
            "Skipped {} documents with repeated content",
            report.duplicates
        ));
    }
    if !args.ids.is_idempotent() {
        warn!(policy = %args.ids, "Ids are not derived from content");
        output::warning("Ephemeral ids: re-running adds duplicate vectors");
    }
    output::field("Id policy", args.ids.as_str());
    for id in &report.ids {
        output::field("Id", id);
    }

    Ok(())
}
