//! In-memory vector index with brute-force cosine similarity search.
//!
//! This provides a simple but correct index over the product catalog. All
//! operations are O(n) for search, which is acceptable for a bounded
//! catalog; nothing here assumes an approximate structure.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use outfitter_core::error::OutfitterError;

/// A single hit returned from a nearest-neighbor query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The product id of the matching entry.
    pub id: i64,
    /// Cosine similarity score.
    pub score: f64,
    /// Display summary carried by the entry.
    pub summary: String,
}

/// An entry held by the vector index, one per indexed product.
///
/// Entries are created by the indexing pipeline and replaced wholesale on
/// rebuild; nothing mutates an entry in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The product id this embedding was built from.
    pub id: i64,
    pub embedding: Vec<f32>,
    /// The exact text that was embedded (the product description).
    pub source_text: String,
    /// Human-readable summary of the product.
    pub summary: String,
}

impl IndexEntry {
    pub fn new(
        id: i64,
        embedding: Vec<f32>,
        source_text: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id,
            embedding,
            source_text: source_text.into(),
            summary: summary.into(),
        }
    }
}

/// Entry plus its insertion sequence number, used to break score ties
/// deterministically in favor of the earliest-inserted entry.
#[derive(Debug, Clone)]
struct StoredEntry {
    entry: IndexEntry,
    seq: u64,
}

#[derive(Debug, Default)]
struct IndexState {
    entries: HashMap<i64, StoredEntry>,
    next_seq: u64,
}

/// In-memory vector index using brute-force cosine similarity.
///
/// Thread-safe via interior RwLock. `replace_all` swaps the entire entry
/// set under one write lock, so concurrent readers observe either the old
/// index or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    state: Arc<RwLock<IndexState>>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(IndexState::default())),
        }
    }

    /// Insert an entry, replacing any existing entry with the same id.
    ///
    /// A replaced entry keeps its original insertion rank for tie-breaking.
    pub fn upsert(&self, entry: IndexEntry) -> Result<(), OutfitterError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| OutfitterError::Vector(format!("Lock poisoned: {}", e)))?;
        let seq = match state.entries.get(&entry.id) {
            Some(existing) => existing.seq,
            None => {
                let seq = state.next_seq;
                state.next_seq += 1;
                seq
            }
        };
        state.entries.insert(entry.id, StoredEntry { entry, seq });
        Ok(())
    }

    /// Return the k entries nearest to the query vector by cosine
    /// similarity, sorted by descending score. Equal scores resolve to the
    /// earliest-inserted entry. An empty index yields an empty result.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, OutfitterError> {
        let state = self
            .state
            .read()
            .map_err(|e| OutfitterError::Vector(format!("Lock poisoned: {}", e)))?;

        let mut scored: Vec<(SearchHit, u64)> = state
            .entries
            .values()
            .map(|stored| {
                let score = cosine_similarity(query, &stored.entry.embedding);
                let hit = SearchHit {
                    id: stored.entry.id,
                    score,
                    summary: stored.entry.summary.clone(),
                };
                (hit, stored.seq)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.score
                .partial_cmp(&a.0.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(hit, _)| hit).collect())
    }

    /// Replace the entire contents of the index in one step.
    ///
    /// Insertion rank follows the order of `entries`; duplicate ids keep
    /// the last entry given.
    pub fn replace_all(&self, entries: Vec<IndexEntry>) -> Result<(), OutfitterError> {
        let mut fresh = HashMap::with_capacity(entries.len());
        let mut seq = 0u64;
        for entry in entries {
            fresh.insert(entry.id, StoredEntry { entry, seq });
            seq += 1;
        }

        let mut state = self
            .state
            .write()
            .map_err(|e| OutfitterError::Vector(format!("Lock poisoned: {}", e)))?;
        state.entries = fresh;
        state.next_seq = seq;
        Ok(())
    }

    /// Fetch a copy of the entry for the given id, if present.
    pub fn get(&self, id: i64) -> Result<Option<IndexEntry>, OutfitterError> {
        let state = self
            .state
            .read()
            .map_err(|e| OutfitterError::Vector(format!("Lock poisoned: {}", e)))?;
        Ok(state.entries.get(&id).map(|stored| stored.entry.clone()))
    }

    /// Return the number of entries currently in the index.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    /// Return true if the index contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute cosine similarity between two vectors, accumulating in f64.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude input.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
