// Path: crates/dps-telemetry/src/http.rs
//! A lightweight HTTP server exposing `/metrics` (Prometheus text exposition)
//! and `/healthz`, run as a sidecar alongside the gRPC and `/execute`
//! surfaces. Identical in shape to the teacher's `telemetry::http` server.

use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

async fn metrics_handler() -> ([(HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::with_capacity(1 << 16);
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(error = %e, "failed to encode prometheus metrics");
    }
    (
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buf.into(),
    )
}

async fn healthz_handler() -> &'static str {
    "OK"
}

async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {err}"),
        )
    }
}

/// Serves `/metrics` and `/healthz` on `addr` until a Ctrl-C signal arrives.
pub async fn run_server(addr: SocketAddr) {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_service_error))
                .layer(TraceLayer::new_for_http())
                .load_shed()
                .concurrency_limit(8)
                .timeout(Duration::from_secs(2)),
        );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "dps-telemetry", error = %e, "failed to bind telemetry http server");
            return;
        }
    };
    tracing::info!(target: "dps-telemetry", addr = %addr, "telemetry server listening");

    let graceful = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(target: "dps-telemetry", error = %e, "failed to install ctrl-c handler");
        }
        tracing::info!(target: "dps-telemetry", "shutting down gracefully");
    });

    if let Err(e) = graceful.await {
        tracing::error!(target: "dps-telemetry", error = %e, "server error");
    }
}
