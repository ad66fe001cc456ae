//! storesync - incremental GraphQL resource sync and vector index loading.
//!
//! This library mirrors cursor-paginated GraphQL collections into local JSON
//! snapshots and loads documents into a vector index with stable,
//! content-derived identifiers.
//!
//! # Example
//!
//! ```no_run
//! use storesync::{GraphqlClient, Resource, ShopConfig, SyncEngine, SyncOptions};
//!
//! # async fn example() -> Result<(), storesync::Error> {
//! let shop = ShopConfig::new(
//!     "https://example.myshopify.com/admin/api/2024-10/graphql.json",
//!     "shpat_token",
//! )?;
//! let client = GraphqlClient::new(shop)?;
//! let engine = SyncEngine::new(client, SyncOptions::default());
//!
//! let report = engine.run(&Resource::products()).await?;
//! println!("{} records added", report.records_added);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graphql;
mod http;
pub mod index;
pub mod sync;
pub mod types;

// Re-export primary types at crate root for convenience
pub use config::{
    EmbeddingConfig, IndexConfig, Metric, ShopConfig, StartPosition, SyncOptions,
    VectorServiceConfig,
};
pub use error::Error;
pub use graphql::GraphqlClient;
pub use index::openai::OpenAiEmbedder;
pub use index::pinecone::PineconeIndex;
pub use index::{
    ContentHasher, Document, Embedder, IdPolicy, IndexUpserter, LoadMode, UpsertReport,
    VectorIndex, load_documents,
};
pub use sync::{
    Edge, Page, PageInfo, Paginator, Resource, SnapshotStore, SyncEngine, SyncOutcome,
    SyncReport, SyncSnapshot,
};
pub use types::{ApiKey, EndpointUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
