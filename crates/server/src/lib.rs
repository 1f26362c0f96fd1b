//! HTTP server for the animedex catalog.
//!
//! Exposed as a library so integration tests can build the router
//! in-process; the `animedex` binary wires the same pieces together.

pub mod api;
pub mod metrics;
pub mod state;
