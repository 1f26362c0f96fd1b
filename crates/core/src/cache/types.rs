//! Types for the local anime cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::CatalogItem;

/// Which code path wrote a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Written back after an on-demand remote fetch.
    RemoteFetch,
    /// Written by a bulk ingestion run.
    IngestionJob,
    /// Written by an operator-triggered refresh of a single item.
    ManualRefresh,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::RemoteFetch => "remote_fetch",
            EntrySource::IngestionJob => "ingestion_job",
            EntrySource::ManualRefresh => "manual_refresh",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "remote_fetch" => Some(EntrySource::RemoteFetch),
            "ingestion_job" => Some(EntrySource::IngestionJob),
            "manual_refresh" => Some(EntrySource::ManualRefresh),
            _ => None,
        }
    }
}

/// A cached catalog item together with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The item snapshot as last fetched from the remote catalog.
    pub item: CatalogItem,
    /// When this snapshot was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Which code path wrote the snapshot.
    pub source: EntrySource,
}

/// Outcome of an upsert: whether the id was new to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The id was not in the cache before.
    Created,
    /// An existing row was replaced.
    Updated,
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached items.
    pub total_items: u64,
    /// Number of distinct genre names across all items.
    pub distinct_genres: u64,
    /// Oldest snapshot in the cache.
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Most recent snapshot in the cache.
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Search parameters for cache queries.
#[derive(Debug, Clone)]
pub struct CacheSearchQuery {
    /// Free-text query matched against titles and synopsis.
    pub query: String,
    /// Page number (1-based).
    pub page: u32,
    /// Maximum results per page.
    pub limit: u32,
}

impl CacheSearchQuery {
    /// Row offset for the requested page. Saturates instead of
    /// overflowing on absurd page/limit combinations.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}
