//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the animedex server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Readiness gate rejections
//! - Cache and ingestion status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "animedex_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("animedex_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "animedex_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Requests rejected by the readiness gate.
pub static GATE_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "animedex_gate_rejections_total",
            "Requests rejected because the dataset is not loaded yet",
        ),
        &["state"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Items currently held in the local cache.
pub static CACHE_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("animedex_cache_items", "Number of items in the local cache").unwrap()
});

/// Ingestion running state (1 = running, 0 = idle).
pub static INGESTION_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "animedex_ingestion_running",
        "Whether an ingestion run is in flight (1) or not (0)",
    )
    .unwrap()
});

/// Items processed by the current or last ingestion run.
pub static INGESTION_PROCESSED_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "animedex_ingestion_processed_items",
        "Items upserted by the current or last ingestion run",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(GATE_REJECTIONS_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(CACHE_ITEMS.clone())).unwrap();
    registry
        .register(Box::new(INGESTION_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(INGESTION_PROCESSED_ITEMS.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding metrics so gauges reflect the live cache and
/// ingestion state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(info) = state.source().info() {
        CACHE_ITEMS.set(info.cache.total_items as i64);
    }

    let job = state.ingest();
    INGESTION_RUNNING.set(if job.is_running() { 1 } else { 0 });
    INGESTION_PROCESSED_ITEMS.set(job.stats().processed_items as i64);
}

/// Normalize a path for metric labels (replace numeric IDs with a placeholder).
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
