//! Strategy dispatch for catalog reads.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{FetchOrigin, SourceError, SourceInfo, Sourced};
use crate::cache::{CacheSearchQuery, CacheStore, EntrySource};
use crate::config::{DataSourceConfig, Strategy};
use crate::remote::{CatalogItem, RemoteCatalog, RemoteError};

/// Routes catalog reads between the cache and the remote catalog
/// according to the configured strategy.
pub struct SourceManager {
    remote: Arc<dyn RemoteCatalog>,
    cache: Arc<dyn CacheStore>,
    config: DataSourceConfig,
}

impl SourceManager {
    pub fn new(
        remote: Arc<dyn RemoteCatalog>,
        cache: Arc<dyn CacheStore>,
        config: DataSourceConfig,
    ) -> Self {
        Self {
            remote,
            cache,
            config,
        }
    }

    /// Get a single title by id.
    pub async fn get_by_id(&self, id: u32) -> Result<Sourced<CatalogItem>, SourceError> {
        match self.config.strategy {
            Strategy::CacheOnly => match self.cache.get(id)? {
                Some(entry) => Ok(Sourced::cache(entry.item)),
                None => Err(SourceError::NotFound(format!("anime {}", id))),
            },
            Strategy::RemoteOnly => {
                let item = self.remote.get_by_id(id).await?;
                self.write_back(std::slice::from_ref(&item));
                Ok(Sourced::remote(item))
            }
            Strategy::Hybrid => {
                if !self.config.force_remote {
                    if let Some(entry) = self.cache.get(id)? {
                        debug!("cache hit for anime {}", id);
                        return Ok(Sourced::cache(entry.item));
                    }
                }

                match self.remote.get_by_id(id).await {
                    Ok(item) => {
                        self.write_back(std::slice::from_ref(&item));
                        Ok(Sourced::remote(item))
                    }
                    Err(RemoteError::NotFound(what)) => Err(SourceError::NotFound(what)),
                    Err(e) => {
                        // Degrade to whatever snapshot we still hold
                        if let Some(entry) = self.cache.get(id)? {
                            warn!("remote failed for anime {}, serving stale cache: {}", id, e);
                            return Ok(Sourced::stale(entry.item));
                        }
                        Err(SourceError::Upstream(e.to_string()))
                    }
                }
            }
        }
    }

    /// Search titles by free-text query.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Sourced<Vec<CatalogItem>>, SourceError> {
        match self.config.strategy {
            Strategy::CacheOnly => Ok(Sourced::cache(self.cache_search(query, page, limit)?)),
            Strategy::RemoteOnly => {
                let remote_page = self.remote.search(query, page, limit).await?;
                self.write_back(&remote_page.items);
                Ok(Sourced::remote(remote_page.items))
            }
            Strategy::Hybrid => {
                if !self.config.force_remote {
                    let cached = self.cache_search(query, page, limit)?;
                    if !cached.is_empty() {
                        debug!("cache hit for search '{}'", query);
                        return Ok(Sourced::cache(cached));
                    }
                }

                match self.remote.search(query, page, limit).await {
                    Ok(remote_page) => {
                        self.write_back(&remote_page.items);
                        Ok(Sourced::remote(remote_page.items))
                    }
                    Err(e) => self.degrade(e, || self.cache_search(query, page, limit)),
                }
            }
        }
    }

    /// The top-rated titles.
    pub async fn top(&self, limit: u32) -> Result<Sourced<Vec<CatalogItem>>, SourceError> {
        match self.config.strategy {
            Strategy::CacheOnly => Ok(Sourced::cache(self.cache_top(limit)?)),
            Strategy::RemoteOnly => {
                let items = self.remote.top(limit).await?;
                self.write_back(&items);
                Ok(Sourced::remote(items))
            }
            Strategy::Hybrid => {
                if !self.config.force_remote {
                    let cached = self.cache_top(limit)?;
                    if !cached.is_empty() {
                        return Ok(Sourced::cache(cached));
                    }
                }

                match self.remote.top(limit).await {
                    Ok(items) => {
                        self.write_back(&items);
                        Ok(Sourced::remote(items))
                    }
                    Err(e) => self.degrade(e, || self.cache_top(limit)),
                }
            }
        }
    }

    /// All genre names present in the cache, sorted.
    pub fn genres(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.cache.genres()?)
    }

    /// Current configuration and cache state.
    pub fn info(&self) -> Result<SourceInfo, SourceError> {
        Ok(SourceInfo {
            strategy: self.config.strategy,
            force_remote: self.config.force_remote,
            cache_enabled: self.config.cache_enabled,
            available_strategies: vec!["cache-only", "remote-only", "hybrid"],
            cache: self.cache.stats()?,
        })
    }

    /// Evict the whole cache. Returns the number of items removed.
    pub fn clear_cache(&self) -> Result<u64, SourceError> {
        if !self.config.cache_enabled {
            return Err(SourceError::Config("cache is disabled".to_string()));
        }
        Ok(self.cache.clear()?)
    }

    fn cache_search(
        &self,
        query: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CatalogItem>, SourceError> {
        let results = self.cache.search(&CacheSearchQuery {
            query: query.to_string(),
            page,
            limit,
        })?;
        Ok(results.into_iter().map(|e| e.item).collect())
    }

    fn cache_top(&self, limit: u32) -> Result<Vec<CatalogItem>, SourceError> {
        Ok(self.cache.top(limit)?.into_iter().map(|e| e.item).collect())
    }

    /// On a remote failure, serve non-empty cached results as stale.
    fn degrade(
        &self,
        err: RemoteError,
        fallback: impl FnOnce() -> Result<Vec<CatalogItem>, SourceError>,
    ) -> Result<Sourced<Vec<CatalogItem>>, SourceError> {
        let cached = fallback()?;
        if !cached.is_empty() {
            warn!("remote failed, serving stale cache: {}", err);
            return Ok(Sourced::stale(cached));
        }
        Err(SourceError::Upstream(err.to_string()))
    }

    /// Best-effort write-back; failures are logged, never surfaced.
    fn write_back(&self, items: &[CatalogItem]) {
        if !self.config.cache_enabled {
            return;
        }
        for item in items {
            if let Err(e) = self.cache.upsert(item, EntrySource::RemoteFetch) {
                warn!("cache write-back failed for anime {}: {}", item.id, e);
            }
        }
    }
}
