//! Anime cache - a local store of catalog snapshots.
//!
//! The cache holds items fetched from the remote catalog so lookups and
//! searches can be served locally before falling back to the network.

mod sqlite;
mod types;

pub use sqlite::SqliteCache;
pub use types::*;

use thiserror::Error;

use crate::remote::CatalogItem;

/// Errors that can occur in cache storage.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Item not found in the cache.
    #[error("Item not found: {0}")]
    NotFound(u32),

    /// Payload serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for anime cache storage.
pub trait CacheStore: Send + Sync {
    /// Look up a single item by its remote id.
    ///
    /// Returns `Ok(None)` on a miss; errors are reserved for storage
    /// failures.
    fn get(&self, id: u32) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace an item snapshot, recording who wrote it.
    ///
    /// Replacement is wholesale; fields from the previous snapshot are
    /// never merged in.
    fn upsert(&self, item: &CatalogItem, source: EntrySource)
        -> Result<UpsertOutcome, CacheError>;

    /// Search cached items by free-text query against titles and synopsis.
    ///
    /// Results are ordered by score descending, unscored items last.
    fn search(&self, query: &CacheSearchQuery) -> Result<Vec<CacheEntry>, CacheError>;

    /// The highest-scored cached items.
    fn top(&self, limit: u32) -> Result<Vec<CacheEntry>, CacheError>;

    /// All distinct genre names present in the cache, sorted.
    fn genres(&self) -> Result<Vec<String>, CacheError>;

    /// Number of cached items.
    fn count(&self) -> Result<u64, CacheError>;

    /// Cache statistics.
    fn stats(&self) -> Result<CacheStats, CacheError>;

    /// Remove all cached data. Returns the number of items removed.
    fn clear(&self) -> Result<u64, CacheError>;
}
