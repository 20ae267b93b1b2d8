//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/body parameters via axum extractors,
//! talks to the AppState services, and returns JSON responses. Product
//! CRUD writes the catalog only; the vector index stays as-is until a
//! reindex or restart picks the changes up.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use outfitter_core::{ProductRecord, SearchResponse};
use outfitter_storage::NewProduct;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub products: u64,
    pub index_entries: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReindexResponse {
    pub indexed: u64,
}

// =============================================================================
// Health
// =============================================================================

/// GET /health - service status, catalog size, and index size.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let uptime = state.start_time.elapsed().as_secs();
    let products = state.products.count()?;
    let index_entries = state.index.len() as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
        products,
        index_entries,
    }))
}

// =============================================================================
// Product CRUD
// =============================================================================

fn validate_new_product(body: &NewProduct) -> Result<(), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("'name' must not be empty".to_string()));
    }
    if !body.price.is_finite() || body.price < 0.0 {
        return Err(ApiError::BadRequest(
            "'price' must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/product - list the full catalog, id ascending.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductRecord>>, ApiError> {
    let records = state.products.list_all()?;
    Ok(Json(records))
}

/// POST /api/product - create a product and return the stored record.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductRecord>), ApiError> {
    validate_new_product(&body)?;
    let record = state.products.insert(&body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/product/{id} - fetch one product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductRecord>, ApiError> {
    match state.products.find_by_id(id)? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("Product {} not found", id))),
    }
}

/// PUT /api/product/{id} - update all writable fields of a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<NewProduct>,
) -> Result<Json<UpdateResponse>, ApiError> {
    validate_new_product(&body)?;
    if state.products.update(id, &body)? {
        Ok(Json(UpdateResponse { updated: true }))
    } else {
        Err(ApiError::NotFound(format!("Product {} not found", id)))
    }
}

/// DELETE /api/product/{id} - remove a product from the catalog.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if state.products.delete(id)? {
        Ok(Json(DeleteResponse { deleted: true }))
    } else {
        Err(ApiError::NotFound(format!("Product {} not found", id)))
    }
}

// =============================================================================
// Search and reindex
// =============================================================================

/// GET /api/aisearch/{query} - answer a free-text product question.
pub async fn aisearch(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<SearchResponse>, ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Search query must not be empty".to_string(),
        ));
    }

    let response = state.orchestrator.search(&query).await?;
    Ok(Json(response))
}

/// POST /api/reindex - re-embed the full catalog and swap the index.
pub async fn reindex(State(state): State<AppState>) -> Result<Json<ReindexResponse>, ApiError> {
    let records = state.products.list_all()?;
    let indexed = state.pipeline.rebuild(&records).await?;
    Ok(Json(ReindexResponse {
        indexed: indexed as u64,
    }))
}
