//! Outfitter API crate - axum HTTP server and route handlers.
//!
//! Provides the REST API for the Outfitter catalog service: product
//! CRUD, the AI search endpoint, reindexing, and health checks.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
