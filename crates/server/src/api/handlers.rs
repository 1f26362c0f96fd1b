use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use animedex_core::ReadinessSnapshot;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub stats: ReadinessSnapshot,
}

/// GET /api/v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        uptime_seconds: (chrono::Utc::now() - state.started_at()).num_seconds(),
    })
}

/// GET /api/v1/readiness
pub async fn readiness(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        ready: state.readiness().is_ready(),
        stats: state.readiness().snapshot(),
    })
}

/// GET /api/v1/metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_dynamic_metrics(&state);
    encode_metrics()
}
