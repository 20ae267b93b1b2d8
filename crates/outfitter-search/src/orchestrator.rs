//! Search orchestration: query in, assembled answer out.
//!
//! The orchestrator drives a fixed sequence per query: embed the query,
//! find the nearest catalog entry, load its product record, bind the
//! template parameters, invoke generation, assemble the response. Each
//! step either produces the input for the next or ends the search
//! (no-match) or fails it (provider or consistency error).

use std::sync::Arc;

use tracing::debug;

use outfitter_core::error::OutfitterError;
use outfitter_core::types::SearchResponse;
use outfitter_storage::repository::ProductRepository;
use outfitter_vector::embedding::{DynEmbeddingService, EmbeddingService};
use outfitter_vector::index::VectorIndex;

use crate::generation::{invoke_generation, DynGenerationService, GenerationService};
use crate::template::{PromptParams, TemplateResolver};

/// Drives catalog searches against shared process-wide state.
///
/// All fields are handles to state owned by the application context; the
/// orchestrator itself is cheap to share behind an `Arc`.
pub struct SearchOrchestrator {
    index: VectorIndex,
    embedder: Arc<dyn DynEmbeddingService>,
    generator: Arc<dyn DynGenerationService>,
    products: Arc<ProductRepository>,
    templates: Arc<TemplateResolver>,
}

impl SearchOrchestrator {
    /// Create an orchestrator with concrete service implementations.
    pub fn new(
        index: VectorIndex,
        embedder: impl EmbeddingService + 'static,
        generator: impl GenerationService + 'static,
        products: Arc<ProductRepository>,
        templates: Arc<TemplateResolver>,
    ) -> Self {
        Self {
            index,
            embedder: Arc::new(embedder),
            generator: Arc::new(generator),
            products,
            templates,
        }
    }

    /// Create an orchestrator from shared dynamic services.
    pub fn new_dyn(
        index: VectorIndex,
        embedder: Arc<dyn DynEmbeddingService>,
        generator: Arc<dyn DynGenerationService>,
        products: Arc<ProductRepository>,
        templates: Arc<TemplateResolver>,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            products,
            templates,
        }
    }

    /// Answer a free-text catalog question.
    ///
    /// An empty index is a normal no-match outcome. An index entry whose
    /// product row has vanished is not: that is store/index drift and
    /// fails the search so the caller knows a reindex is due. Provider
    /// failures propagate unchanged from either the embedding or the
    /// generation step; there is no retry and no substitute answer text.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, OutfitterError> {
        let embedding = self.embedder.embed_boxed(query).await?;

        let hits = self.index.nearest(&embedding, 1)?;
        let Some(hit) = hits.first() else {
            debug!("Index has no entries, returning no-match response");
            return Ok(SearchResponse::no_match());
        };
        debug!(id = hit.id, score = hit.score, "Nearest catalog entry");

        let record = self.products.find_by_id(hit.id)?.ok_or_else(|| {
            OutfitterError::DataConsistency(format!(
                "Index entry {} has no product row; reindex required",
                hit.id
            ))
        })?;

        let template = self.templates.resolved().await;
        let params = PromptParams::for_product(query, &record);
        let text = invoke_generation(self.generator.as_ref(), template, &params).await?;

        Ok(SearchResponse::matched(text, record))
    }
}
