//! Outfitter application binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Parse CLI arguments and initialize tracing
//! 2. Load configuration, overlay provider keys from env, validate (fatal)
//! 3. Open SQLite, run migrations, seed the starter catalog
//! 4. Build the catalog index via a full pipeline rebuild (fatal)
//! 5. Start the axum REST API server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use outfitter_api::{routes, AppState};
use outfitter_core::OutfitterConfig;
use outfitter_search::{
    DynGenerationService, RemoteGenerationClient, SearchOrchestrator, TemplateResolver,
};
use outfitter_storage::{seed_catalog, Database, ProductRepository};
use outfitter_vector::{DynEmbeddingService, IndexingPipeline, RemoteEmbeddingClient, VectorIndex};

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing. --log-level wins over RUST_LOG, which wins over "info".
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Outfitter v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = OutfitterConfig::load_or_default(&config_file);

    config.apply_env_overrides();
    config.server.port = args.resolve_port(config.server.port);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.database.path = data_dir.join("outfitter.db").to_string_lossy().to_string();
    }

    // A missing provider key fails here, not in the middle of a search.
    config.validate()?;

    // Storage.
    let db_path = PathBuf::from(&config.database.path);
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let products = Arc::new(ProductRepository::new(Arc::clone(&db)));
    if config.database.seed_on_start {
        seed_catalog(&products)?;
    }

    // Remote model providers.
    let embedder: Arc<dyn DynEmbeddingService> =
        Arc::new(RemoteEmbeddingClient::from_config(&config.embedding)?);
    let generator: Arc<dyn DynGenerationService> =
        Arc::new(RemoteGenerationClient::from_config(&config.generation)?);

    // Build the catalog index before serving. A provider failure here is
    // fatal: the process does not serve a search path it could not
    // initialize.
    let index = VectorIndex::new();
    let pipeline = IndexingPipeline::new_dyn(index.clone(), Arc::clone(&embedder));
    let records = products.list_all()?;
    pipeline.rebuild(&records).await?;

    let templates = Arc::new(TemplateResolver::new(config.templates.directory.clone()));
    let orchestrator = SearchOrchestrator::new_dyn(
        index.clone(),
        Arc::clone(&embedder),
        generator,
        Arc::clone(&products),
        templates,
    );

    let state = AppState::new(config.clone(), index, products, pipeline, orchestrator);

    routes::start_server(&config, state).await?;

    Ok(())
}
