//! Data source layer - decides where each catalog read is served from.
//!
//! Reads go to the cache, the remote catalog, or both, depending on the
//! configured strategy. The hybrid strategy is cache-first with remote
//! fallback and write-back, and degrades to stale cached snapshots when
//! the remote is down.

mod manager;
mod types;

pub use manager::SourceManager;
pub use types::*;

use thiserror::Error;

use crate::cache::CacheError;
use crate::remote::RemoteError;

/// Errors surfaced by the data source layer.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested item exists nowhere we can reach.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote catalog failed and no cached fallback was available.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The cache failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The operation is not available under the current configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CacheError> for SourceError {
    fn from(e: CacheError) -> Self {
        SourceError::Cache(e.to_string())
    }
}

impl From<RemoteError> for SourceError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::NotFound(what) => SourceError::NotFound(what),
            other => SourceError::Upstream(other.to_string()),
        }
    }
}
