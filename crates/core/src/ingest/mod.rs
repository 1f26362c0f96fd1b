//! Bulk ingestion - walks the remote catalog into the local cache.
//!
//! One run fetches page 1 to discover pagination, then walks the
//! remaining pages sequentially with a fixed delay, retrying individual
//! pages a bounded number of times. Progress is observable while the
//! run is in flight, and the run drives the readiness lifecycle.

mod job;
mod types;

pub use job::IngestJob;
pub use types::{IngestError, IngestProgress, IngestStats, PageError, RunStatus};
