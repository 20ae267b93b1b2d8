//! Application state shared across all route handlers.
//!
//! AppState holds references to the catalog repository, the vector
//! index, the indexing pipeline, and the search orchestrator. It is
//! passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use outfitter_core::OutfitterConfig;
use outfitter_search::SearchOrchestrator;
use outfitter_storage::ProductRepository;
use outfitter_vector::{IndexingPipeline, VectorIndex};

/// Shared application state.
///
/// All fields are `Arc`-backed (VectorIndex clones share the same
/// underlying store), so cloning per request task is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed after startup.
    pub config: Arc<OutfitterConfig>,
    /// In-memory vector index over the product catalog.
    pub index: VectorIndex,
    /// Product catalog repository.
    pub products: Arc<ProductRepository>,
    /// Embed-and-swap pipeline used by reindexing.
    pub pipeline: Arc<IndexingPipeline>,
    /// Query-to-answer search orchestrator.
    pub orchestrator: Arc<SearchOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    ///
    /// The repository arrives pre-wrapped because the orchestrator holds
    /// a handle to the same instance.
    pub fn new(
        config: OutfitterConfig,
        index: VectorIndex,
        products: Arc<ProductRepository>,
        pipeline: IndexingPipeline,
        orchestrator: SearchOrchestrator,
    ) -> Self {
        Self {
            config: Arc::new(config),
            index,
            products,
            pipeline: Arc::new(pipeline),
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}
