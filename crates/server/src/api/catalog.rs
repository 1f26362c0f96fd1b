//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use animedex_core::{
    genres::{describe_genres, GenreDescriptor},
    CatalogItem, FetchOrigin, SourceError, SourceInfo, Sourced,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    #[serde(default = "default_top_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_search_limit() -> u32 {
    25
}

fn default_top_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct AnimeResponse {
    pub data: CatalogItem,
    pub origin: FetchOrigin,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
pub struct AnimeListResponse {
    pub data: Vec<CatalogItem>,
    pub total: usize,
    pub origin: FetchOrigin,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
pub struct GenreListResponse {
    pub genres: Vec<GenreDescriptor>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_source_error(e: SourceError) -> ApiError {
    match e {
        SourceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
        // No upstream detail leaks to clients
        SourceError::Upstream(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Upstream catalog unavailable".to_string(),
            }),
        ),
        SourceError::Cache(_) | SourceError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        ),
    }
}

fn list_response(sourced: Sourced<Vec<CatalogItem>>) -> AnimeListResponse {
    AnimeListResponse {
        total: sourced.value.len(),
        degraded: sourced.origin == FetchOrigin::StaleCache,
        data: sourced.value,
        origin: sourced.origin,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/anime/search
///
/// Free-text search over the catalog.
pub async fn search_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<AnimeListResponse>, ApiError> {
    let sourced = state
        .source()
        .search(&params.q, params.page, params.limit)
        .await
        .map_err(map_source_error)?;
    Ok(Json(list_response(sourced)))
}

/// GET /api/v1/anime/top
///
/// The top-rated titles.
pub async fn top_anime(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopParams>,
) -> Result<Json<AnimeListResponse>, ApiError> {
    let sourced = state
        .source()
        .top(params.limit)
        .await
        .map_err(map_source_error)?;
    Ok(Json(list_response(sourced)))
}

/// GET /api/v1/anime/{id}
///
/// Get a single title by id.
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<AnimeResponse>, ApiError> {
    let sourced = state
        .source()
        .get_by_id(id)
        .await
        .map_err(map_source_error)?;
    Ok(Json(AnimeResponse {
        degraded: sourced.origin == FetchOrigin::StaleCache,
        data: sourced.value,
        origin: sourced.origin,
    }))
}

/// GET /api/v1/genres
///
/// Distinct genres in the cache, enriched with display metadata.
pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenreListResponse>, ApiError> {
    let names = state.source().genres().map_err(map_source_error)?;
    let genres = describe_genres(&names);
    Ok(Json(GenreListResponse {
        total: genres.len(),
        genres,
    }))
}

/// GET /api/v1/source/info
///
/// Active data source strategy and cache statistics.
pub async fn source_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SourceInfo>, ApiError> {
    let info = state.source().info().map_err(map_source_error)?;
    Ok(Json(info))
}

/// DELETE /api/v1/source/cache
///
/// Evict every cached item.
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let cleared = state.source().clear_cache().map_err(map_source_error)?;
    Ok(Json(ClearCacheResponse { cleared }))
}
