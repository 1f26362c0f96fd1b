//! Mock remote catalog for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::remote::{CatalogItem, CatalogPage, PageInfo, RemoteCatalog, RemoteError};

/// A recorded remote query for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedRemoteQuery {
    ListPage { page: u32 },
    GetById { id: u32 },
    Search { query: String, page: u32, limit: u32 },
    Top { limit: u32 },
}

/// Mock implementation of the RemoteCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable items, either as one pool or as scripted pages
/// - Track queries for assertions
/// - Simulate failures, per page or on the next call
#[derive(Debug)]
pub struct MockRemoteCatalog {
    /// Items by id, used for get/search/top.
    items: Arc<RwLock<BTreeMap<u32, CatalogItem>>>,
    /// Scripted listing pages. When empty, all items fit on page 1.
    pages: Arc<RwLock<Vec<Vec<CatalogItem>>>>,
    /// Remaining failures per page number.
    page_failures: Arc<RwLock<HashMap<u32, u32>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedRemoteQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<RemoteError>>>,
}

impl Default for MockRemoteCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteCatalog {
    /// Create a new empty mock remote catalog.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            pages: Arc::new(RwLock::new(Vec::new())),
            page_failures: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Add a single item.
    pub async fn add_item(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id, item);
    }

    /// Script the listing pages. Items on the pages are also added to
    /// the item pool so `get_by_id` finds them.
    pub async fn set_pages(&self, pages: Vec<Vec<CatalogItem>>) {
        let mut items = self.items.write().await;
        for page in &pages {
            for item in page {
                items.insert(item.id, item.clone());
            }
        }
        *self.pages.write().await = pages;
    }

    /// Make `list_page` fail `times` times for the given page before
    /// succeeding.
    pub async fn fail_page(&self, page: u32, times: u32) {
        self.page_failures.write().await.insert(page, times);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: RemoteError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedRemoteQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Number of `list_page` calls for a specific page.
    pub async fn list_page_calls(&self, page: u32) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| matches!(q, RecordedRemoteQuery::ListPage { page: p } if *p == page))
            .count()
    }

    async fn take_error(&self) -> Option<RemoteError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, query: RecordedRemoteQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl RemoteCatalog for MockRemoteCatalog {
    async fn list_page(&self, page: u32) -> Result<CatalogPage, RemoteError> {
        self.record(RecordedRemoteQuery::ListPage { page }).await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        {
            let mut failures = self.page_failures.write().await;
            if let Some(remaining) = failures.get_mut(&page) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RemoteError::Api {
                        status: 500,
                        message: format!("scripted failure for page {}", page),
                    });
                }
            }
        }

        let pages = self.pages.read().await;
        if pages.is_empty() {
            let items: Vec<CatalogItem> = self.items.read().await.values().cloned().collect();
            let total = items.len() as u64;
            return Ok(CatalogPage {
                items,
                page: PageInfo {
                    current_page: 1,
                    last_page: 1,
                    total_items: total,
                },
            });
        }

        let total_items: u64 = pages.iter().map(|p| p.len() as u64).sum();
        let last_page = pages.len() as u32;
        let items = pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default();

        Ok(CatalogPage {
            items,
            page: PageInfo {
                current_page: page,
                last_page,
                total_items,
            },
        })
    }

    async fn get_by_id(&self, id: u32) -> Result<CatalogItem, RemoteError> {
        self.record(RecordedRemoteQuery::GetById { id }).await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("anime {}", id)))
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<CatalogPage, RemoteError> {
        self.record(RecordedRemoteQuery::Search {
            query: query.to_string(),
            page,
            limit,
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let items = self.items.read().await;
        let query_lower = query.to_lowercase();

        let matches: Vec<CatalogItem> = items
            .values()
            .filter(|i| i.title.to_lowercase().contains(&query_lower))
            .cloned()
            .collect();

        let total = matches.len() as u64;
        let start = (page.saturating_sub(1) * limit) as usize;
        let page_items: Vec<CatalogItem> =
            matches.into_iter().skip(start).take(limit as usize).collect();

        Ok(CatalogPage {
            items: page_items,
            page: PageInfo {
                current_page: page,
                last_page: (total as u32).div_ceil(limit.max(1)).max(1),
                total_items: total,
            },
        })
    }

    async fn top(&self, limit: u32) -> Result<Vec<CatalogItem>, RemoteError> {
        self.record(RecordedRemoteQuery::Top { limit }).await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let items = self.items.read().await;
        let mut scored: Vec<CatalogItem> =
            items.values().filter(|i| i.score.is_some()).cloned().collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit as usize);

        Ok(scored)
    }
}
