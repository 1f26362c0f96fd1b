pub mod cache;
pub mod config;
pub mod genres;
pub mod ingest;
pub mod readiness;
pub mod remote;
pub mod source;
pub mod testing;

pub use cache::{CacheError, CacheStore, EntrySource, SqliteCache, UpsertOutcome};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, Strategy,
};
pub use ingest::{IngestError, IngestJob, IngestProgress, IngestStats, RunStatus};
pub use readiness::{LoadState, Readiness, ReadinessSnapshot};
pub use remote::{CatalogItem, CatalogPage, JikanClient, RemoteCatalog, RemoteError};
pub use source::{FetchOrigin, SourceError, SourceInfo, SourceManager, Sourced};
