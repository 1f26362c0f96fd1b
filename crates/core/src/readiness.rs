//! Readiness tracking for the ingested dataset.
//!
//! The server refuses catalog traffic until the first ingestion run has
//! completed. Once loaded, readiness stays set across later reloads so
//! a background refresh never takes the API offline.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of the local dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// No ingestion run has started yet.
    NotLoaded,
    /// An ingestion run is in progress.
    Loading,
    /// The dataset has been loaded.
    Loaded,
    /// The last ingestion run failed.
    LoadFailed,
}

/// Point-in-time view of readiness.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessSnapshot {
    pub state: LoadState,
    /// True once any run has completed, and kept true afterwards.
    pub is_loaded: bool,
    pub last_load_time: Option<DateTime<Utc>>,
    pub total_items: Option<u64>,
    pub load_error: Option<String>,
}

/// Shared readiness holder.
///
/// One instance is created at startup and handed to both the ingestion
/// job (writer) and the HTTP gate (reader).
pub struct Readiness {
    inner: RwLock<ReadinessSnapshot>,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ReadinessSnapshot {
                state: LoadState::NotLoaded,
                is_loaded: false,
                last_load_time: None,
                total_items: None,
                load_error: None,
            }),
        }
    }

    /// Whether catalog traffic should be admitted.
    pub fn is_ready(&self) -> bool {
        self.inner.read().unwrap().is_loaded
    }

    pub fn snapshot(&self) -> ReadinessSnapshot {
        self.inner.read().unwrap().clone()
    }

    /// A run has started.
    pub fn mark_loading(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.state = LoadState::Loading;
        inner.load_error = None;
    }

    /// A run has completed.
    pub fn mark_loaded(&self, total_items: u64) {
        let mut inner = self.inner.write().unwrap();
        inner.state = LoadState::Loaded;
        inner.is_loaded = true;
        inner.last_load_time = Some(Utc::now());
        inner.total_items = Some(total_items);
        inner.load_error = None;
    }

    /// A run has failed. Readiness earned by a previous run is kept.
    pub fn mark_failed(&self, error: impl Into<String>) {
        let mut inner = self.inner.write().unwrap();
        inner.state = LoadState::LoadFailed;
        inner.load_error = Some(error.into());
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
