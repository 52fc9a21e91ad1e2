// Path: crates/dps-telemetry/src/lib.rs
//! Observability infrastructure for the Data Provider Service: structured
//! JSON logging initialization, a Prometheus `/metrics` endpoint, and the
//! per-component metric registration helpers the RPC and HTTP surfaces
//! install on top.
//!
//! Grounded on the teacher's `telemetry` crate: the same
//! `tracing-subscriber` JSON-layer setup, the same `/metrics`+`/healthz`
//! axum surface, with the RPC- and Invoker-specific counters this service
//! needs in place of the teacher's `ioi_*` gateway/consensus metrics.

/// A lightweight HTTP server exposing `/metrics` and `/healthz`.
pub mod http;
/// Global structured logging initialization.
pub mod init;
/// Metric registration for the RPC server and Script Invoker.
pub mod metrics;

pub use init::init_tracing;
pub use metrics::{invoker_metrics, rpc_metrics, InvokerMetrics, RpcMetrics};
