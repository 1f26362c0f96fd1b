//! Ingestion lifecycle integration tests.
//!
//! These tests drive a full run end to end: discovery on page 1, the
//! sequential page walk with retries, cache persistence, and the
//! readiness transitions the server gates traffic on.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use animedex_core::{
    cache::CacheStore,
    config::IngestionConfig,
    readiness::LoadState,
    testing::{fixtures, MockRemoteCatalog},
    IngestError, IngestJob, Readiness, RunStatus, SqliteCache,
};

/// Test helper bundling the ingestion collaborators.
struct TestHarness {
    remote: Arc<MockRemoteCatalog>,
    cache: Arc<SqliteCache>,
    readiness: Arc<Readiness>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        Self {
            remote: Arc::new(MockRemoteCatalog::new()),
            cache: Arc::new(SqliteCache::new(&db_path).expect("Failed to create cache")),
            readiness: Arc::new(Readiness::new()),
            _temp_dir: temp_dir,
        }
    }

    fn create_job(&self) -> Arc<IngestJob> {
        let config = IngestionConfig {
            run_on_startup: false,
            page_delay_ms: 10,
            max_page_retries: 3,
            retry_delay_ms: 0,
            max_pages: None,
        };

        Arc::new(IngestJob::new(
            config,
            Arc::clone(&self.remote) as Arc<dyn animedex_core::RemoteCatalog>,
            Arc::clone(&self.cache) as Arc<dyn CacheStore>,
            Arc::clone(&self.readiness),
        ))
    }

    async fn wait_for_finish(&self, job: &Arc<IngestJob>, timeout: Duration) {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if !job.is_running() && job.progress().status != RunStatus::Running {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ingestion did not finish within {:?}", timeout);
    }
}

#[tokio::test]
async fn test_full_run_marks_ready() {
    let harness = TestHarness::new();
    harness
        .remote
        .set_pages(vec![
            vec![
                fixtures::catalog_item(1, "Cowboy Bebop", Some(8.75)),
                fixtures::catalog_item(5, "Fullmetal Alchemist", Some(9.1)),
            ],
            vec![fixtures::catalog_item(20, "Naruto", Some(7.9))],
        ])
        .await;

    let job = harness.create_job();
    assert!(!harness.readiness.is_ready());

    job.try_start().expect("run should start");
    harness.wait_for_finish(&job, Duration::from_secs(5)).await;

    let progress = job.progress();
    assert_eq!(progress.status, RunStatus::Completed);
    assert_eq!(progress.total_pages, 2);
    assert_eq!(progress.created, 3);
    assert!(progress.errors.is_empty());

    assert!(harness.readiness.is_ready());
    let snap = harness.readiness.snapshot();
    assert_eq!(snap.state, LoadState::Loaded);
    assert_eq!(snap.total_items, Some(3));

    // Data is queryable afterwards
    assert_eq!(harness.cache.count().unwrap(), 3);
    assert!(harness.cache.get(5).unwrap().is_some());
    assert_eq!(harness.cache.genres().unwrap(), vec!["Action"]);
}

#[tokio::test]
async fn test_flaky_page_recovers_within_budget() {
    let harness = TestHarness::new();
    harness
        .remote
        .set_pages(vec![
            vec![fixtures::catalog_item(1, "A", None)],
            vec![fixtures::catalog_item(2, "B", None)],
            vec![fixtures::catalog_item(3, "C", None)],
        ])
        .await;
    // Page 2 fails twice, then succeeds on the third attempt
    harness.remote.fail_page(2, 2).await;

    let job = harness.create_job();
    job.try_start().expect("run should start");
    harness.wait_for_finish(&job, Duration::from_secs(5)).await;

    let progress = job.progress();
    assert_eq!(progress.status, RunStatus::Completed);
    assert_eq!(progress.errors.len(), 2);
    assert!(progress.errors.iter().all(|e| e.page == 2));
    assert_eq!(progress.processed_items, 3);
    assert_eq!(harness.cache.count().unwrap(), 3);
}

#[tokio::test]
async fn test_discovery_failure_leaves_server_gated() {
    let harness = TestHarness::new();
    harness
        .remote
        .set_pages(vec![vec![fixtures::catalog_item(1, "A", None)]])
        .await;
    harness.remote.fail_page(1, 10).await;

    let job = harness.create_job();
    job.try_start().expect("run should start");
    harness.wait_for_finish(&job, Duration::from_secs(5)).await;

    let progress = job.progress();
    assert_eq!(progress.status, RunStatus::Failed);
    assert!(progress.error.is_some());

    assert!(!harness.readiness.is_ready());
    assert_eq!(harness.readiness.snapshot().state, LoadState::LoadFailed);
    assert_eq!(harness.cache.count().unwrap(), 0);
}

#[tokio::test]
async fn test_manual_reload_keeps_api_open() {
    let harness = TestHarness::new();
    harness
        .remote
        .set_pages(vec![vec![fixtures::catalog_item(1, "A", None)]])
        .await;

    let job = harness.create_job();
    job.try_start().expect("first run");
    harness.wait_for_finish(&job, Duration::from_secs(5)).await;
    assert!(harness.readiness.is_ready());

    // Reload: readiness stays set while the run is in flight
    job.try_start().expect("reload");
    assert!(harness.readiness.is_ready());
    harness.wait_for_finish(&job, Duration::from_secs(5)).await;

    let progress = job.progress();
    assert_eq!(progress.status, RunStatus::Completed);
    assert_eq!(progress.updated, 1);
    assert!(harness.readiness.is_ready());
}

#[tokio::test]
async fn test_only_one_run_at_a_time() {
    let harness = TestHarness::new();
    harness
        .remote
        .set_pages(vec![
            vec![fixtures::catalog_item(1, "A", None)],
            vec![fixtures::catalog_item(2, "B", None)],
        ])
        .await;

    let job = harness.create_job();
    job.try_start().expect("first start");
    assert!(matches!(job.try_start(), Err(IngestError::AlreadyRunning)));

    harness.wait_for_finish(&job, Duration::from_secs(5)).await;
}
