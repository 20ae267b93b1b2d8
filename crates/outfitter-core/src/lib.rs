//! Shared foundation for the Outfitter catalog search system.
//!
//! Holds the configuration model, the error type used across every crate,
//! and the core domain types (`ProductRecord`, `SearchResponse`).

pub mod config;
pub mod error;
pub mod types;

pub use config::OutfitterConfig;
pub use error::{OutfitterError, Result};
pub use types::{ProductRecord, SearchResponse, NO_MATCH_TEXT};
