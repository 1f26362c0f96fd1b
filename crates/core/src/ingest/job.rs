//! Bulk ingestion run implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::types::{IngestError, IngestProgress, IngestStats, PageError, RunStatus};
use crate::cache::{CacheStore, EntrySource, UpsertOutcome};
use crate::config::IngestionConfig;
use crate::readiness::Readiness;
use crate::remote::{CatalogPage, RemoteCatalog};

/// Walks the remote catalog page by page and upserts every item into
/// the cache. At most one run is in flight per process.
pub struct IngestJob {
    config: IngestionConfig,
    remote: Arc<dyn RemoteCatalog>,
    cache: Arc<dyn CacheStore>,
    readiness: Arc<Readiness>,
    running: Arc<AtomicBool>,
    progress: Arc<RwLock<IngestProgress>>,
}

impl IngestJob {
    pub fn new(
        config: IngestionConfig,
        remote: Arc<dyn RemoteCatalog>,
        cache: Arc<dyn CacheStore>,
        readiness: Arc<Readiness>,
    ) -> Self {
        Self {
            config,
            remote,
            cache,
            readiness,
            running: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(RwLock::new(IngestProgress::idle())),
        }
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Progress of the current or last run.
    pub fn progress(&self) -> IngestProgress {
        self.progress.read().unwrap().clone()
    }

    /// Roll-up summary of the current or last run.
    pub fn stats(&self) -> IngestStats {
        self.progress.read().unwrap().stats()
    }

    /// Start a run in the background.
    ///
    /// Returns `AlreadyRunning` without side effects when a run is in
    /// flight.
    pub fn try_start(self: &Arc<Self>) -> Result<(), IngestError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Ingestion run already in progress, ignoring start request");
            return Err(IngestError::AlreadyRunning);
        }

        let job = Arc::clone(self);
        tokio::spawn(async move {
            job.run().await;
            job.running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    /// Execute one full run. Callers go through `try_start`; this is
    /// only directly reachable from the spawned task.
    async fn run(&self) {
        info!("Ingestion run started");
        self.readiness.mark_loading();
        {
            let mut progress = self.progress.write().unwrap();
            *progress = IngestProgress::idle();
            progress.status = RunStatus::Running;
            progress.started_at = Some(Utc::now());
        }

        // Page 1 doubles as pagination discovery; losing it is fatal
        let first = match self.fetch_page_with_retry(1).await {
            Some(page) => page,
            None => {
                let message = "Could not fetch page 1, aborting run".to_string();
                warn!("{}", message);
                self.finish_failed(message);
                return;
            }
        };

        let mut total_pages = first.page.last_page.max(1);
        if let Some(max_pages) = self.config.max_pages {
            total_pages = total_pages.min(max_pages);
        }
        {
            let mut progress = self.progress.write().unwrap();
            progress.total_pages = total_pages;
            progress.total_items = first.page.total_items;
            progress.current_page = 1;
        }

        self.process_page(&first);

        for page_number in 2..=total_pages {
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;

            {
                let mut progress = self.progress.write().unwrap();
                progress.current_page = page_number;
            }

            match self.fetch_page_with_retry(page_number).await {
                Some(page) => self.process_page(&page),
                None => {
                    // Attempts are recorded already; move on to the next page
                    warn!("Skipping page {} after exhausting retries", page_number);
                    let mut progress = self.progress.write().unwrap();
                    progress.skipped_pages.push(page_number);
                }
            }
        }

        let total_cached = self.cache.count().unwrap_or_else(|e| {
            warn!("Could not count cache after run: {}", e);
            0
        });

        let (created, updated, error_count) = {
            let mut progress = self.progress.write().unwrap();
            progress.status = RunStatus::Completed;
            progress.finished_at = Some(Utc::now());
            (progress.created, progress.updated, progress.errors.len())
        };

        self.readiness.mark_loaded(total_cached);
        info!(
            "Ingestion run completed: {} created, {} updated, {} failed attempts",
            created, updated, error_count
        );
    }

    /// Fetch one page, retrying transient failures. Every failed
    /// attempt is recorded in the progress error list. Returns `None`
    /// once the budget is exhausted or the error is not retryable.
    async fn fetch_page_with_retry(&self, page_number: u32) -> Option<CatalogPage> {
        let max_attempts = self.config.max_page_retries.max(1);

        for attempt in 1..=max_attempts {
            match self.remote.list_page(page_number).await {
                Ok(page) => return Some(page),
                Err(e) => {
                    warn!(
                        "Fetching page {} failed (attempt {}/{}): {}",
                        page_number, attempt, max_attempts, e
                    );
                    let retryable = e.is_retryable();
                    {
                        let mut progress = self.progress.write().unwrap();
                        progress.errors.push(PageError {
                            page: page_number,
                            attempt,
                            message: e.to_string(),
                        });
                    }
                    if !retryable {
                        return None;
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                    }
                }
            }
        }

        None
    }

    /// Upsert all items from a fetched page into the cache.
    fn process_page(&self, page: &CatalogPage) {
        let mut created = 0u64;
        let mut updated = 0u64;
        let mut processed = 0u64;

        for item in &page.items {
            match self.cache.upsert(item, EntrySource::IngestionJob) {
                Ok(UpsertOutcome::Created) => created += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Err(e) => {
                    warn!("Upsert failed for anime {}: {}", item.id, e);
                    continue;
                }
            }
            processed += 1;
        }

        let mut progress = self.progress.write().unwrap();
        progress.created += created;
        progress.updated += updated;
        progress.processed_items += processed;
    }

    fn finish_failed(&self, message: String) {
        {
            let mut progress = self.progress.write().unwrap();
            progress.status = RunStatus::Failed;
            progress.finished_at = Some(Utc::now());
            progress.error = Some(message.clone());
        }
        self.readiness.mark_failed(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SqliteCache;
    use crate::testing::{fixtures, MockRemoteCatalog};

    fn fast_config() -> IngestionConfig {
        IngestionConfig {
            run_on_startup: false,
            page_delay_ms: 0,
            max_page_retries: 3,
            retry_delay_ms: 0,
            max_pages: None,
        }
    }

    fn build_job(
        config: IngestionConfig,
        remote: Arc<MockRemoteCatalog>,
    ) -> (Arc<IngestJob>, Arc<SqliteCache>, Arc<Readiness>) {
        let cache = Arc::new(SqliteCache::in_memory().unwrap());
        let readiness = Arc::new(Readiness::new());
        let job = Arc::new(IngestJob::new(
            config,
            remote,
            cache.clone(),
            readiness.clone(),
        ));
        (job, cache, readiness)
    }

    async fn wait_until_finished(job: &Arc<IngestJob>) {
        for _ in 0..200 {
            if !job.is_running() && job.progress().status != RunStatus::Running {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ingestion run did not finish in time");
    }

    #[tokio::test]
    async fn test_run_walks_all_pages() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![
                vec![
                    fixtures::catalog_item(1, "A", Some(8.0)),
                    fixtures::catalog_item(2, "B", Some(7.0)),
                ],
                vec![fixtures::catalog_item(3, "C", None)],
            ])
            .await;

        let (job, cache, readiness) = build_job(fast_config(), remote);
        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        assert_eq!(progress.status, RunStatus::Completed);
        assert_eq!(progress.total_pages, 2);
        assert_eq!(progress.processed_items, 3);
        assert_eq!(progress.created, 3);
        assert_eq!(progress.updated, 0);
        assert!(progress.errors.is_empty());
        assert!(progress.finished_at.is_some());

        assert_eq!(cache.count().unwrap(), 3);
        assert_eq!(
            cache.get(1).unwrap().unwrap().source,
            EntrySource::IngestionJob
        );
        assert!(readiness.is_ready());
        assert_eq!(readiness.snapshot().total_items, Some(3));

        let stats = job.stats();
        assert_eq!(stats.status, RunStatus::Completed);
        assert_eq!(stats.processed_items, 3);
        assert_eq!(stats.failed_attempts, 0);
        assert!(stats.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_second_run_counts_updates() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![vec![fixtures::catalog_item(1, "A", None)]])
            .await;

        let (job, _cache, _readiness) = build_job(fast_config(), remote);
        job.try_start().unwrap();
        wait_until_finished(&job).await;

        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        assert_eq!(progress.status, RunStatus::Completed);
        assert_eq!(progress.created, 0);
        assert_eq!(progress.updated, 1);
    }

    #[tokio::test]
    async fn test_failing_page_is_retried_then_succeeds() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![
                vec![fixtures::catalog_item(1, "A", None)],
                vec![fixtures::catalog_item(2, "B", None)],
                vec![fixtures::catalog_item(3, "C", None)],
            ])
            .await;
        remote.fail_page(2, 2).await;

        let (job, cache, _readiness) = build_job(fast_config(), remote.clone());
        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        assert_eq!(progress.status, RunStatus::Completed);
        assert_eq!(progress.errors.len(), 2);
        assert!(progress.errors.iter().all(|e| e.page == 2));
        assert_eq!(progress.processed_items, 3);
        assert_eq!(cache.count().unwrap(), 3);
        assert_eq!(remote.list_page_calls(2).await, 3);
    }

    #[tokio::test]
    async fn test_exhausted_page_is_skipped() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![
                vec![fixtures::catalog_item(1, "A", None)],
                vec![fixtures::catalog_item(2, "B", None)],
                vec![fixtures::catalog_item(3, "C", None)],
            ])
            .await;
        remote.fail_page(2, 10).await;

        let (job, cache, readiness) = build_job(fast_config(), remote);
        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        // The run still completes; the bad page cost three attempts
        assert_eq!(progress.status, RunStatus::Completed);
        assert_eq!(progress.errors.len(), 3);
        assert_eq!(progress.skipped_pages, vec![2]);
        assert_eq!(progress.processed_items, 2);
        assert_eq!(cache.count().unwrap(), 2);
        assert!(readiness.is_ready());

        let stats = job.stats();
        assert_eq!(stats.failed_attempts, 3);
        assert_eq!(stats.skipped_pages, 1);
    }

    #[tokio::test]
    async fn test_page_one_failure_is_run_fatal() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![vec![fixtures::catalog_item(1, "A", None)]])
            .await;
        remote.fail_page(1, 10).await;

        let (job, cache, readiness) = build_job(fast_config(), remote);
        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        assert_eq!(progress.status, RunStatus::Failed);
        assert!(progress.error.is_some());
        assert_eq!(progress.errors.len(), 3);
        assert_eq!(cache.count().unwrap(), 0);

        assert!(!readiness.is_ready());
        let snap = readiness.snapshot();
        assert_eq!(snap.state, crate::readiness::LoadState::LoadFailed);
        assert!(snap.load_error.is_some());
    }

    #[tokio::test]
    async fn test_try_start_rejects_concurrent_run() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![
                vec![fixtures::catalog_item(1, "A", None)],
                vec![fixtures::catalog_item(2, "B", None)],
            ])
            .await;

        let mut config = fast_config();
        config.page_delay_ms = 200;
        let (job, _cache, _readiness) = build_job(config, remote);

        job.try_start().unwrap();
        let second = job.try_start();
        assert!(matches!(second, Err(IngestError::AlreadyRunning)));

        wait_until_finished(&job).await;
        // After completion a new run can start again
        assert!(job.try_start().is_ok());
        wait_until_finished(&job).await;
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_walk() {
        let remote = Arc::new(MockRemoteCatalog::new());
        remote
            .set_pages(vec![
                vec![fixtures::catalog_item(1, "A", None)],
                vec![fixtures::catalog_item(2, "B", None)],
                vec![fixtures::catalog_item(3, "C", None)],
            ])
            .await;

        let mut config = fast_config();
        config.max_pages = Some(2);
        let (job, cache, _readiness) = build_job(config, remote);

        job.try_start().unwrap();
        wait_until_finished(&job).await;

        let progress = job.progress();
        assert_eq!(progress.total_pages, 2);
        assert_eq!(cache.count().unwrap(), 2);
    }
}
