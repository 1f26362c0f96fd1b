//! Types for the data source layer.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::Strategy;

/// Where a response was actually served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrigin {
    /// Served from the local cache.
    Cache,
    /// Served from the remote catalog.
    Remote,
    /// The remote failed; an older cached snapshot was served instead.
    StaleCache,
}

/// A value together with the origin it was served from.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: FetchOrigin,
}

impl<T> Sourced<T> {
    pub fn cache(value: T) -> Self {
        Self {
            value,
            origin: FetchOrigin::Cache,
        }
    }

    pub fn remote(value: T) -> Self {
        Self {
            value,
            origin: FetchOrigin::Remote,
        }
    }

    pub fn stale(value: T) -> Self {
        Self {
            value,
            origin: FetchOrigin::StaleCache,
        }
    }
}

/// Current data source configuration and cache state, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub strategy: Strategy,
    pub force_remote: bool,
    pub cache_enabled: bool,
    pub available_strategies: Vec<&'static str>,
    pub cache: CacheStats,
}
