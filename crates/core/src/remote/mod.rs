//! Remote catalog integration for the Jikan API.
//!
//! This module provides the client used to pull anime metadata from the
//! upstream catalog, both for on-demand cache misses and for bulk
//! ingestion runs.

mod jikan;
mod types;

pub use jikan::{JikanClient, JikanConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the remote catalog.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl RemoteError {
    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RemoteError::NotFound(_) | RemoteError::Parse(_))
    }
}

/// Trait for remote catalog clients.
///
/// The production implementation is [`JikanClient`]; tests swap in a
/// scripted mock.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Fetch one page of the full catalog listing.
    async fn list_page(&self, page: u32) -> Result<CatalogPage, RemoteError>;

    /// Fetch a single title by its remote id.
    async fn get_by_id(&self, id: u32) -> Result<CatalogItem, RemoteError>;

    /// Search titles by free-text query.
    async fn search(&self, query: &str, page: u32, limit: u32)
        -> Result<CatalogPage, RemoteError>;

    /// Fetch the top-rated titles.
    async fn top(&self, limit: u32) -> Result<Vec<CatalogItem>, RemoteError>;
}
