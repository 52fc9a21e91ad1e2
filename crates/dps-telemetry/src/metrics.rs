// Path: crates/dps-telemetry/src/metrics.rs
//! Metric registration for the RPC server and Script Invoker, following the
//! teacher's `http-rpc-gateway::install_gateway_metrics` pattern: a
//! `OnceCell`-backed vec metric per concern, installed once at process
//! startup and read through a small accessor struct thereafter.

use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec,
};

static RPC_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static RPC_REQUEST_LATENCY: OnceCell<HistogramVec> = OnceCell::new();
static INVOKER_SCRIPTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static INVOKER_SCRIPT_LATENCY: OnceCell<HistogramVec> = OnceCell::new();
static INVOKER_CACHE_EVENTS: OnceCell<IntCounterVec> = OnceCell::new();

/// Registers every metric this crate exposes. Idempotent: a second call is
/// a no-op (each `register_*!` call only inserts into the process-wide
/// Prometheus registry the first time its `OnceCell` is set).
pub fn install() {
    let _ = RPC_REQUESTS_TOTAL.set(
        register_int_counter_vec!(
            "dps_rpc_requests_total",
            "Total Index Reader RPC requests handled, by method and result",
            &["method", "result"]
        )
        .expect("register_int_counter_vec"),
    );
    let _ = RPC_REQUEST_LATENCY.set(
        register_histogram_vec!(
            "dps_rpc_request_duration_seconds",
            "Latency of Index Reader RPC requests, by method",
            &["method"],
            exponential_buckets(0.0005, 2.0, 15).expect("buckets")
        )
        .expect("register_histogram_vec"),
    );
    let _ = INVOKER_SCRIPTS_TOTAL.set(
        register_int_counter_vec!(
            "dps_invoker_scripts_total",
            "Total script invocations, by result",
            &["result"]
        )
        .expect("register_int_counter_vec"),
    );
    let _ = INVOKER_SCRIPT_LATENCY.set(
        register_histogram_vec!(
            "dps_invoker_script_duration_seconds",
            "Latency of script invocations",
            &["result"],
            exponential_buckets(0.001, 2.0, 15).expect("buckets")
        )
        .expect("register_histogram_vec"),
    );
    let _ = INVOKER_CACHE_EVENTS.set(
        register_int_counter_vec!(
            "dps_invoker_register_cache_events_total",
            "Register-read cache hits and misses",
            &["event"]
        )
        .expect("register_int_counter_vec"),
    );
}

macro_rules! get_metric {
    ($m:ident) => {
        $m.get().expect("dps_telemetry::metrics::install() must run before use")
    };
}

/// Accessor for the RPC server's request counters.
#[derive(Clone, Copy, Default)]
pub struct RpcMetrics;

impl RpcMetrics {
    /// Records one completed request for `method`, labeled `ok` or `error`.
    pub fn record(&self, method: &str, ok: bool, elapsed_seconds: f64) {
        let result = if ok { "ok" } else { "error" };
        get_metric!(RPC_REQUESTS_TOTAL)
            .with_label_values(&[method, result])
            .inc();
        get_metric!(RPC_REQUEST_LATENCY)
            .with_label_values(&[method])
            .observe(elapsed_seconds);
    }
}

/// Accessor for the Script Invoker's invocation and cache counters.
#[derive(Clone, Copy, Default)]
pub struct InvokerMetrics;

impl InvokerMetrics {
    /// Records one completed script invocation, labeled `ok` or `error`.
    pub fn record_script(&self, ok: bool, elapsed_seconds: f64) {
        let result = if ok { "ok" } else { "error" };
        get_metric!(INVOKER_SCRIPTS_TOTAL).with_label_values(&[result]).inc();
        get_metric!(INVOKER_SCRIPT_LATENCY)
            .with_label_values(&[result])
            .observe(elapsed_seconds);
    }

    /// Records one register-read cache hit or miss.
    pub fn record_cache_event(&self, hit: bool) {
        let event = if hit { "hit" } else { "miss" };
        get_metric!(INVOKER_CACHE_EVENTS).with_label_values(&[event]).inc();
    }
}

/// Returns the RPC metrics accessor. `install()` must have run first.
pub fn rpc_metrics() -> RpcMetrics {
    RpcMetrics
}

/// Returns the Invoker metrics accessor. `install()` must have run first.
pub fn invoker_metrics() -> InvokerMetrics {
    InvokerMetrics
}
