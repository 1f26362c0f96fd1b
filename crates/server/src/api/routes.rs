use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{catalog, handlers, ingestion, middleware::metrics_middleware, middleware::readiness_gate};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Catalog routes wait for the first ingestion run to complete
    let gated_routes = Router::new()
        .route("/anime/search", get(catalog::search_anime))
        .route("/anime/top", get(catalog::top_anime))
        .route("/anime/{id}", get(catalog::get_anime))
        .route("/genres", get(catalog::list_genres))
        .route("/source/info", get(catalog::source_info))
        .route("/source/cache", delete(catalog::clear_cache))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            readiness_gate,
        ));

    // Operational routes stay reachable in every load state
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/readiness", get(handlers::readiness))
        .route("/metrics", get(handlers::metrics))
        .route("/ingestion/reload", post(ingestion::reload))
        .route("/ingestion/progress", get(ingestion::progress))
        .merge(gated_routes)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
