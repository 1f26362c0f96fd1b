use std::sync::Arc;

use chrono::{DateTime, Utc};

use animedex_core::{Config, IngestJob, Readiness, SourceManager};

/// Shared application state
pub struct AppState {
    config: Config,
    source: Arc<SourceManager>,
    ingest: Arc<IngestJob>,
    readiness: Arc<Readiness>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<SourceManager>,
        ingest: Arc<IngestJob>,
        readiness: Arc<Readiness>,
    ) -> Self {
        Self {
            config,
            source,
            ingest,
            readiness,
            started_at: Utc::now(),
        }
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &SourceManager {
        self.source.as_ref()
    }

    pub fn ingest(&self) -> &Arc<IngestJob> {
        &self.ingest
    }

    pub fn readiness(&self) -> &Readiness {
        self.readiness.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
