//! Outfitter vector crate - in-memory index, embedding services, and the
//! catalog indexing pipeline.
//!
//! Provides brute-force cosine similarity search over product embeddings,
//! an embedding service trait with a remote client and a mock
//! implementation, and the pipeline that rebuilds the index from the
//! product catalog.

pub mod embedding;
pub mod index;
pub mod pipeline;

pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding, RemoteEmbeddingClient};
pub use index::{IndexEntry, SearchHit, VectorIndex};
pub use pipeline::{product_summary, IndexingPipeline};
