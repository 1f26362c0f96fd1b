//! Common test utilities for API testing with a mocked remote catalog.
//!
//! Builds an in-process router wired to a `MockRemoteCatalog` and an
//! on-disk SQLite cache, so the full HTTP surface can be exercised
//! without network access.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use animedex_core::{
    testing::MockRemoteCatalog, CacheStore, Config, IngestJob, Readiness, RemoteCatalog,
    RunStatus, SourceManager, SqliteCache,
};
use animedex_server::api::create_router;
use animedex_server::state::AppState;

/// Re-export fixtures for test convenience
pub use animedex_core::testing::fixtures;

/// A decoded HTTP response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process server with controllable collaborators.
pub struct TestFixture {
    pub router: Router,
    /// Mock remote - script pages, items and failures
    pub remote: Arc<MockRemoteCatalog>,
    pub cache: Arc<SqliteCache>,
    pub readiness: Arc<Readiness>,
    pub ingest: Arc<IngestJob>,
    _temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let remote = Arc::new(MockRemoteCatalog::new());
        let cache = Arc::new(SqliteCache::new(&db_path).expect("Failed to create cache"));
        let readiness = Arc::new(Readiness::new());

        let source = Arc::new(SourceManager::new(
            Arc::clone(&remote) as Arc<dyn RemoteCatalog>,
            Arc::clone(&cache) as Arc<dyn CacheStore>,
            config.data_source.clone(),
        ));
        let ingest = Arc::new(IngestJob::new(
            config.ingestion.clone(),
            Arc::clone(&remote) as Arc<dyn RemoteCatalog>,
            Arc::clone(&cache) as Arc<dyn CacheStore>,
            Arc::clone(&readiness),
        ));

        let state = Arc::new(AppState::new(
            config,
            source,
            Arc::clone(&ingest),
            Arc::clone(&readiness),
        ));

        Self {
            router: create_router(state),
            remote,
            cache,
            readiness,
            ingest,
            _temp_dir: temp_dir,
        }
    }

    /// Run one ingestion to completion so gated routes open up.
    pub async fn load_dataset(&self) {
        self.ingest.try_start().expect("ingestion should start");
        self.wait_for_ingestion().await;
    }

    pub async fn wait_for_ingestion(&self) {
        for _ in 0..500 {
            if !self.ingest.is_running() && self.ingest.progress().status != RunStatus::Running {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ingestion did not finish in time");
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path).await
    }

    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Method::POST, path).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path).await
    }

    async fn request(&self, method: Method, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Config suitable for fast test runs.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.ingestion.run_on_startup = false;
    config.ingestion.page_delay_ms = 0;
    config.ingestion.retry_delay_ms = 0;
    config
}
