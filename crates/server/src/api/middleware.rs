//! Readiness gate and metrics middleware for API routes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use animedex_core::LoadState;

use crate::metrics::{
    normalize_path, GATE_REJECTIONS_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Body returned to requests rejected by the readiness gate.
#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub status: String,
    pub message: String,
    #[serde(rename = "retryAfterSeconds")]
    pub retry_after_seconds: u32,
}

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Readiness gate for catalog routes.
///
/// Rejects requests with 503 until the first ingestion run has
/// completed. Requests are never queued; clients are told how long to
/// back off. Once the dataset has loaded, later reloads do not close
/// the gate again.
pub async fn readiness_gate(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.readiness().is_ready() {
        return next.run(request).await;
    }

    let snapshot = state.readiness().snapshot();
    let (label, message, retry_after_seconds) = match snapshot.state {
        LoadState::LoadFailed => (
            "load_failed",
            match snapshot.load_error {
                Some(error) => format!("Initial data load failed: {}", error),
                None => "Initial data load failed".to_string(),
            },
            5,
        ),
        _ => (
            "loading",
            "The catalog is still loading, try again shortly".to_string(),
            3,
        ),
    };

    GATE_REJECTIONS_TOTAL.with_label_values(&[label]).inc();

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(GateResponse {
            status: "loading".to_string(),
            message,
            retry_after_seconds,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use animedex_core::{
        testing::MockRemoteCatalog, Config, IngestJob, Readiness, SourceManager, SqliteCache,
    };

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn create_test_state() -> Arc<AppState> {
        let config = Config::default();
        let remote = Arc::new(MockRemoteCatalog::new());
        let cache = Arc::new(SqliteCache::in_memory().unwrap());
        let readiness = Arc::new(Readiness::new());

        let source = Arc::new(SourceManager::new(
            remote.clone(),
            cache.clone(),
            config.data_source.clone(),
        ));
        let ingest = Arc::new(IngestJob::new(
            config.ingestion.clone(),
            remote,
            cache,
            Arc::clone(&readiness),
        ));

        Arc::new(AppState::new(config, source, ingest, readiness))
    }

    fn gated_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .layer(middleware::from_fn_with_state(state.clone(), readiness_gate))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_gate_rejects_before_load() {
        let state = create_test_state();
        let app = gated_app(state);

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "loading");
        assert!(!json["message"].as_str().unwrap().is_empty());
        assert_eq!(json["retryAfterSeconds"], 3);
    }

    #[tokio::test]
    async fn test_gate_admits_after_load() {
        let state = create_test_state();
        state.readiness().mark_loaded(10);
        let app = gated_app(state);

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gate_backs_off_longer_after_failed_load() {
        let state = create_test_state();
        state.readiness().mark_failed("page 1 unreachable");
        let app = gated_app(state);

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["retryAfterSeconds"], 5);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("page 1 unreachable"));
    }

    #[tokio::test]
    async fn test_gate_stays_open_during_reload() {
        let state = create_test_state();
        state.readiness().mark_loaded(10);
        // A later reload re-enters Loading without revoking readiness
        state.readiness().mark_loading();
        let app = gated_app(state);

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
