//! Catalog indexing pipeline.
//!
//! The IndexingPipeline turns product records into vector index entries:
//! embed each description, attach a display summary, then swap the whole
//! entry set into the index in one step. Rebuilds are full and idempotent;
//! there is no incremental update path.

use std::sync::Arc;

use tracing::info;

use outfitter_core::error::OutfitterError;
use outfitter_core::types::ProductRecord;

use crate::embedding::{DynEmbeddingService, EmbeddingService};
use crate::index::{IndexEntry, VectorIndex};

/// Render the display summary stored alongside a product's embedding.
///
/// The wording is part of the service's observable output and must not
/// drift.
pub fn product_summary(record: &ProductRecord) -> String {
    format!(
        "{} is a product that costs {} and is described as {}",
        record.name, record.price, record.description
    )
}

/// Builds the vector index from the product catalog.
///
/// The embedder is shared dynamically so the same client instance can serve
/// both indexing and query embedding.
pub struct IndexingPipeline {
    index: VectorIndex,
    embedder: Arc<dyn DynEmbeddingService>,
}

impl IndexingPipeline {
    /// Create a pipeline over the given index with a concrete embedder.
    pub fn new(index: VectorIndex, embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            index,
            embedder: Arc::new(embedder),
        }
    }

    /// Create a pipeline sharing an already-boxed embedder.
    pub fn new_dyn(index: VectorIndex, embedder: Arc<dyn DynEmbeddingService>) -> Self {
        Self { index, embedder }
    }

    /// Rebuild the index from the full set of catalog records.
    ///
    /// Embeds every description first and only then swaps the new entry set
    /// in, so concurrent readers never see a half-built index. No record is
    /// skipped: every description goes to the embedder as-is, and the first
    /// embedding failure aborts the run and leaves the index unchanged.
    ///
    /// Returns the number of entries in the index after the swap.
    pub async fn rebuild(&self, records: &[ProductRecord]) -> Result<usize, OutfitterError> {
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            let embedding = self.embedder.embed_boxed(&record.description).await?;
            entries.push(IndexEntry::new(
                record.id,
                embedding,
                record.description.clone(),
                product_summary(record),
            ));
        }

        self.index.replace_all(entries)?;
        let indexed = self.index.len();

        info!(indexed, total = records.len(), "Catalog index rebuilt");
        Ok(indexed)
    }

    /// Get a reference to the underlying vector index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Get a clone of the shared embedder.
    pub fn embedder(&self) -> Arc<dyn DynEmbeddingService> {
        Arc::clone(&self.embedder)
    }
}
