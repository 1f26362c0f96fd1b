//! Types for ingestion runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced when controlling ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A run is already in progress.
    #[error("An ingestion run is already in progress")]
    AlreadyRunning,
}

/// Lifecycle of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has happened yet.
    Idle,
    Running,
    Completed,
    Failed,
}

/// One failed page fetch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PageError {
    pub page: u32,
    pub attempt: u32,
    pub message: String,
}

/// Live progress of the current (or last) ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestProgress {
    pub status: RunStatus,
    /// Page currently being processed (0 before the run discovers pages).
    pub current_page: u32,
    /// Total pages the remote reported for this run.
    pub total_pages: u32,
    /// Total items the remote reported for this run.
    pub total_items: u64,
    /// Items upserted so far.
    pub processed_items: u64,
    pub created: u64,
    pub updated: u64,
    /// Every failed fetch attempt, including retries that later succeeded.
    pub errors: Vec<PageError>,
    /// Pages abandoned after exhausting the retry budget.
    pub skipped_pages: Vec<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when the whole run failed.
    pub error: Option<String>,
}

/// Roll-up summary of the current (or last) run.
///
/// Cheaper to ship around than the full progress record because the
/// per-attempt error list is reduced to counts.
#[derive(Debug, Clone, Serialize)]
pub struct IngestStats {
    pub status: RunStatus,
    pub total_pages: u32,
    pub processed_items: u64,
    pub created: u64,
    pub updated: u64,
    /// Failed fetch attempts across all pages, retries included.
    pub failed_attempts: u64,
    /// Pages abandoned after exhausting the retry budget.
    pub skipped_pages: u64,
    /// Wall-clock duration, once the run has finished.
    pub duration_ms: Option<i64>,
}

impl IngestProgress {
    pub fn idle() -> Self {
        Self {
            status: RunStatus::Idle,
            current_page: 0,
            total_pages: 0,
            total_items: 0,
            processed_items: 0,
            created: 0,
            updated: 0,
            errors: Vec::new(),
            skipped_pages: Vec::new(),
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Reduce this progress record to its roll-up summary.
    pub fn stats(&self) -> IngestStats {
        let duration_ms = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        };
        IngestStats {
            status: self.status,
            total_pages: self.total_pages,
            processed_items: self.processed_items,
            created: self.created,
            updated: self.updated,
            failed_attempts: self.errors.len() as u64,
            skipped_pages: self.skipped_pages.len() as u64,
            duration_ms,
        }
    }
}
