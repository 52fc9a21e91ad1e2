// Path: crates/dps-executor-http/src/lib.rs
//! The Executor Endpoint (`spec.md` §4.8): a thin HTTP surface exposing
//! `POST /execute`, parsing script arguments and delegating to the Script
//! Invoker.
//!
//! Layered the way the teacher's `http-rpc-gateway` layers its own surface
//! (`ServiceBuilder` with `HandleErrorLayer`/`LoadShedLayer`/
//! `ConcurrencyLimitLayer`/`TimeoutLayer`, `CatchPanicLayer` and
//! `TraceLayer` outside the fallible stack, a request body size cap), minus
//! the IP-bucket rate limiter the teacher's public gateway needs and this
//! internal sandbox-facing endpoint does not.

use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use dps_api::IndexReader;
use dps_invoker::Invoker;
use dps_types::{convert, DpsError};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tower::{limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// `POST /execute`'s request body, per `spec.md` §4.8.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// The height to execute the script against. Required.
    pub height: u64,
    /// The script's source text.
    pub script: String,
    /// Positional arguments, each in `Kind(Value)` wire form (e.g.
    /// `UInt64(42)`), parsed with `dps_types::convert::parse_kind_value_literal`.
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// `POST /execute`'s response body.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    height: u64,
    script: String,
    arguments: Vec<String>,
    result: serde_json::Value,
}

/// The taxonomy of HTTP-level failures this endpoint returns, per
/// `spec.md` §4.8: 400 for parse/validation, 500 for invocation.
pub enum ExecuteError {
    /// The request body or an argument literal failed to parse/validate.
    BadRequest(String),
    /// The script failed during execution, or an index error aborted it.
    Invocation(String),
}

impl IntoResponse for ExecuteError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ExecuteError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg),
            ExecuteError::Invocation(msg) => {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "INVOCATION_ERROR", msg)
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": { "code": code, "message": message } })),
        )
            .into_response()
    }
}

impl From<DpsError> for ExecuteError {
    fn from(e: DpsError) -> Self {
        match e {
            DpsError::InvalidArgument(msg) | DpsError::Config(msg) => ExecuteError::BadRequest(msg),
            other => ExecuteError::Invocation(other.to_string()),
        }
    }
}

struct ExecutorState<I> {
    invoker: Invoker<I>,
}

async fn execute_handler<I: IndexReader + 'static>(
    State(state): State<Arc<ExecutorState<I>>>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ExecuteError> {
    let started = std::time::Instant::now();
    let metrics = dps_telemetry::invoker_metrics();

    let parsed_args: Vec<_> = request
        .arguments
        .iter()
        .map(|literal| {
            convert::parse_kind_value_literal(literal)
                .map_err(|e| ExecuteError::BadRequest(format!("argument {literal:?}: {e}")))
        })
        .collect::<Result<_, _>>()?;
    let args_bytes = convert::encode_args(&parsed_args);

    let cancel = CancellationToken::new();
    let outcome = state
        .invoker
        .script(request.height, request.script.as_bytes(), &args_bytes, &cancel)
        .await;

    let raw_result = match outcome {
        Ok(bytes) => bytes,
        Err(e) => {
            metrics.record_script(false, started.elapsed().as_secs_f64());
            return Err(e.into());
        }
    };

    let result = convert::decode_result(&raw_result)
        .map(|scalar| convert::scalar_to_json(&scalar))
        .unwrap_or_else(|_| serde_json::Value::String(hex::encode(&raw_result)));

    metrics.record_script(true, started.elapsed().as_secs_f64());

    Ok(Json(ExecuteResponse {
        height: request.height,
        script: request.script,
        arguments: request.arguments,
        result,
    }))
}

/// `GET /metrics`, matching the teacher's `http-rpc-gateway::metrics_handler`:
/// every request surface carries its own Prometheus scrape route, not just
/// the standalone telemetry sidecar.
async fn metrics_handler() -> ([(axum::http::HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::with_capacity(1 << 14);
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::error!(target: "dps-executor-http", error = %e, "failed to encode prometheus metrics");
    }
    ([(CONTENT_TYPE, encoder.format_type().to_string())], buf.into())
}

async fn healthz_handler() -> &'static str {
    "OK"
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Json(serde_json::json!({
                "error": { "code": "TIMEOUT", "message": "request timed out" }
            })),
        )
            .into_response()
    } else {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": { "code": "OVERLOADED", "message": err.to_string() }
            })),
        )
            .into_response()
    }
}

/// Configuration for the Executor Endpoint's HTTP server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorHttpConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:8701`.
    pub listen_addr: String,
    /// Maximum number of concurrently in-flight `/execute` requests.
    pub concurrency_limit: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Maximum accepted request body size, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ExecutorHttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8701".to_string(),
            concurrency_limit: 64,
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

fn router<I: IndexReader + 'static>(invoker: Invoker<I>, config: &ExecutorHttpConfig) -> Router {
    let state = Arc::new(ExecutorState { invoker });

    Router::new()
        .route("/execute", post(execute_handler::<I>))
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(LoadShedLayer::new())
                .layer(ConcurrencyLimitLayer::new(config.concurrency_limit))
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
}

/// Serves `POST /execute` on `config.listen_addr` until the process
/// receives a shutdown signal via `shutdown`.
pub async fn run_server<I: IndexReader + 'static>(
    invoker: Invoker<I>,
    config: ExecutorHttpConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = config.listen_addr.parse()?;
    let app = router(invoker, &config);

    tracing::info!(target: "dps-executor-http", %addr, "executor endpoint listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!(target: "dps-executor-http", "shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dps_invoker::InvokerConfig;
    use dps_test_utils::InMemoryIndex;
    use std::sync::Arc as StdArc;

    fn invoker() -> Invoker<InMemoryIndex> {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(dps_telemetry::metrics::install);
        Invoker::new(StdArc::new(InMemoryIndex::empty()), InvokerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn rejects_argument_not_matching_kind_value_syntax() {
        let state = StdArc::new(ExecutorState { invoker: invoker() });
        let request = ExecuteRequest {
            height: 1,
            script: String::new(),
            arguments: vec!["not-a-kind-value".to_string()],
        };
        let err = execute_handler(State(state), Json(request)).await.unwrap_err();
        assert!(matches!(err, ExecuteError::BadRequest(_)));
    }

    #[tokio::test]
    async fn invocation_failure_surfaces_as_invocation_error() {
        let state = StdArc::new(ExecutorState { invoker: invoker() });
        let request = ExecuteRequest {
            height: 1,
            script: "not a valid wasm module".to_string(),
            arguments: vec![],
        };
        let err = execute_handler(State(state), Json(request)).await.unwrap_err();
        assert!(matches!(err, ExecuteError::Invocation(_)));
    }
}
