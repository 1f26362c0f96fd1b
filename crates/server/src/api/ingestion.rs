//! Ingestion control handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use animedex_core::{IngestError, IngestProgress};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/v1/ingestion/reload
///
/// Kick off a full reload in the background. Returns immediately; the
/// run is observable through the progress endpoint.
pub async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, impl IntoResponse> {
    match state.ingest().try_start() {
        Ok(()) => Ok(Json(ReloadResponse {
            accepted: true,
            error: None,
        })),
        Err(e @ IngestError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ReloadResponse {
                accepted: false,
                error: Some(e.to_string()),
            }),
        )),
    }
}

/// GET /api/v1/ingestion/progress
///
/// Snapshot of the current or last ingestion run.
pub async fn progress(State(state): State<Arc<AppState>>) -> Json<IngestProgress> {
    Json(state.ingest().progress())
}
