// Path: crates/dps-rpc/src/server.rs
//! `RpcServer`: a thin façade translating `pb::IndexReaderService` calls into
//! `dps_api::IndexReader` calls over an injected backend.
//!
//! Every method validates its request shape before touching the index, per
//! `spec.md` §4.5 ("malformed requests are rejected before any index read").
//! A request is only as trusted as its wire encoding; a 31-byte `block_id` or
//! a zero height on a method that forbids it is rejected here, not passed
//! down to the backend to discover.

use crate::pb::{self, index_reader_service_server::IndexReaderService};
use dps_api::IndexReader;
use dps_types::{
    BlockId, CollectionId, DpsError, Height, LedgerPath, SealId, TxId,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::Instrument;

/// Serves the Index Reader contract over gRPC, backed by any `IndexReader`
/// implementation (in practice, `dps-index::LocalIndex`).
pub struct RpcServer<I> {
    index: Arc<I>,
}

impl<I> RpcServer<I> {
    /// Wraps an `IndexReader` for gRPC service.
    pub fn new(index: Arc<I>) -> Self {
        Self { index }
    }
}

fn id32(bytes: &[u8], field: &'static str) -> Result<[u8; 32], Status> {
    if bytes.len() != 32 {
        return Err(Status::invalid_argument(format!(
            "{field} must be exactly 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn positive_height(h: u64, field: &'static str) -> Result<Height, Status> {
    if h == 0 {
        return Err(Status::invalid_argument(format!("{field} must be > 0")));
    }
    Ok(h)
}

/// Wraps a single handler body in an `info_span!` and records its
/// completion (method, ok/error, latency) to `dps_telemetry::rpc_metrics()`,
/// per `spec.md` §4.5's requirement that the RPC server carry per-method
/// request counts and latency alongside its structured logging.
async fn track<T, F>(method: &'static str, body: F) -> Result<T, Status>
where
    F: Future<Output = Result<T, Status>>,
{
    let span = tracing::info_span!("dps_rpc_request", method);
    async move {
        let start = Instant::now();
        let result = body.await;
        let elapsed = start.elapsed().as_secs_f64();
        dps_telemetry::rpc_metrics().record(method, result.is_ok(), elapsed);
        match &result {
            Ok(_) => tracing::info!(elapsed_seconds = elapsed, "request completed"),
            Err(status) => tracing::debug!(code = ?status.code(), "request failed"),
        }
        result
    }
    .instrument(span)
    .await
}

fn map_err(e: DpsError) -> Status {
    match e {
        DpsError::InvalidArgument(msg) => Status::invalid_argument(msg),
        DpsError::NotIndexed(msg) => Status::not_found(msg),
        DpsError::CorruptedIndex(msg) => Status::data_loss(msg),
        DpsError::BackendUnavailable(msg) => Status::unavailable(msg),
        DpsError::Codec(e) => Status::data_loss(e.to_string()),
        DpsError::Invocation(msg) => Status::internal(msg),
        DpsError::Config(msg) => Status::internal(msg),
    }
}

#[tonic::async_trait]
impl<I: IndexReader + 'static> IndexReaderService for RpcServer<I> {
    async fn get_first(
        &self,
        _request: Request<pb::GetFirstRequest>,
    ) -> Result<Response<pb::GetFirstResponse>, Status> {
        track("get_first", async {
            let cancel = CancellationToken::new();
            let height = self.index.first(&cancel).await.map_err(map_err)?;
            Ok(Response::new(pb::GetFirstResponse { height }))
        })
        .await
    }

    async fn get_last(
        &self,
        _request: Request<pb::GetLastRequest>,
    ) -> Result<Response<pb::GetLastResponse>, Status> {
        track("get_last", async {
            let cancel = CancellationToken::new();
            let height = self.index.last(&cancel).await.map_err(map_err)?;
            Ok(Response::new(pb::GetLastResponse { height }))
        })
        .await
    }

    async fn get_height_for_block(
        &self,
        request: Request<pb::GetHeightForBlockRequest>,
    ) -> Result<Response<pb::GetHeightForBlockResponse>, Status> {
        track("get_height_for_block", async {
            let req = request.into_inner();
            let raw = id32(&req.block_id, "block_id")?;
            let cancel = CancellationToken::new();
            let height = self
                .index
                .height_for_block(BlockId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            Ok(Response::new(pb::GetHeightForBlockResponse {
                block_id: req.block_id,
                height,
            }))
        })
        .await
    }

    async fn get_commit(
        &self,
        request: Request<pb::GetCommitRequest>,
    ) -> Result<Response<pb::GetCommitResponse>, Status> {
        track("get_commit", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let commit = self.index.commit(h, &cancel).await.map_err(map_err)?;
            Ok(Response::new(pb::GetCommitResponse {
                height: h,
                commit: commit.as_bytes().to_vec(),
            }))
        })
        .await
    }

    async fn get_header(
        &self,
        request: Request<pb::GetHeaderRequest>,
    ) -> Result<Response<pb::GetHeaderResponse>, Status> {
        track("get_header", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let header = self.index.header(h, &cancel).await.map_err(map_err)?;
            let data = dps_types::codec::encode(&header).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetHeaderResponse { height: h, data }))
        })
        .await
    }

    async fn get_events(
        &self,
        request: Request<pb::GetEventsRequest>,
    ) -> Result<Response<pb::GetEventsResponse>, Status> {
        track("get_events", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let events = self
                .index
                .events(h, &req.types, &cancel)
                .await
                .map_err(map_err)?;
            let data = dps_types::codec::encode(&events).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetEventsResponse {
                height: h,
                types: req.types,
                data,
            }))
        })
        .await
    }

    async fn get_register_values(
        &self,
        request: Request<pb::GetRegisterValuesRequest>,
    ) -> Result<Response<pb::GetRegisterValuesResponse>, Status> {
        track("get_register_values", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            if req.paths.is_empty() {
                return Err(Status::invalid_argument("paths must be non-empty"));
            }
            let paths: Vec<LedgerPath> = req
                .paths
                .iter()
                .map(|p| id32(p, "paths[]").map(LedgerPath::new))
                .collect::<Result<_, _>>()?;
            let cancel = CancellationToken::new();
            let values = self.index.values(h, &paths, &cancel).await.map_err(map_err)?;
            Ok(Response::new(pb::GetRegisterValuesResponse {
                height: h,
                paths: req.paths,
                values,
            }))
        })
        .await
    }

    async fn get_collection(
        &self,
        request: Request<pb::GetCollectionRequest>,
    ) -> Result<Response<pb::GetCollectionResponse>, Status> {
        track("get_collection", async {
            let req = request.into_inner();
            let raw = id32(&req.collection_id, "collection_id")?;
            let cancel = CancellationToken::new();
            let collection = self
                .index
                .collection(CollectionId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            let data = dps_types::codec::encode(&collection).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetCollectionResponse {
                collection_id: req.collection_id,
                data,
            }))
        })
        .await
    }

    async fn list_collections_for_height(
        &self,
        request: Request<pb::ListCollectionsForHeightRequest>,
    ) -> Result<Response<pb::ListCollectionsForHeightResponse>, Status> {
        track("list_collections_for_height", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let ids = self
                .index
                .collections_by_height(h, &cancel)
                .await
                .map_err(map_err)?;
            Ok(Response::new(pb::ListCollectionsForHeightResponse {
                height: h,
                collection_ids: ids.iter().map(|id| id.as_bytes().to_vec()).collect(),
            }))
        })
        .await
    }

    async fn get_guarantee(
        &self,
        request: Request<pb::GetGuaranteeRequest>,
    ) -> Result<Response<pb::GetGuaranteeResponse>, Status> {
        track("get_guarantee", async {
            let req = request.into_inner();
            let raw = id32(&req.collection_id, "collection_id")?;
            let cancel = CancellationToken::new();
            let guarantee = self
                .index
                .guarantee(CollectionId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            let data = dps_types::codec::encode(&guarantee).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetGuaranteeResponse {
                collection_id: req.collection_id,
                data,
            }))
        })
        .await
    }

    async fn get_transaction(
        &self,
        request: Request<pb::GetTransactionRequest>,
    ) -> Result<Response<pb::GetTransactionResponse>, Status> {
        track("get_transaction", async {
            let req = request.into_inner();
            let raw = id32(&req.transaction_id, "transaction_id")?;
            let cancel = CancellationToken::new();
            let tx = self
                .index
                .transaction(TxId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            let data = dps_types::codec::encode(&tx).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetTransactionResponse {
                transaction_id: req.transaction_id,
                data,
            }))
        })
        .await
    }

    async fn get_height_for_transaction(
        &self,
        request: Request<pb::GetHeightForTransactionRequest>,
    ) -> Result<Response<pb::GetHeightForTransactionResponse>, Status> {
        track("get_height_for_transaction", async {
            let req = request.into_inner();
            let raw = id32(&req.transaction_id, "transaction_id")?;
            let cancel = CancellationToken::new();
            let height = self
                .index
                .height_for_transaction(TxId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            Ok(Response::new(pb::GetHeightForTransactionResponse {
                transaction_id: req.transaction_id,
                height,
            }))
        })
        .await
    }

    async fn list_transactions_for_height(
        &self,
        request: Request<pb::ListTransactionsForHeightRequest>,
    ) -> Result<Response<pb::ListTransactionsForHeightResponse>, Status> {
        track("list_transactions_for_height", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let ids = self
                .index
                .transactions_by_height(h, &cancel)
                .await
                .map_err(map_err)?;
            Ok(Response::new(pb::ListTransactionsForHeightResponse {
                height: h,
                transaction_ids: ids.iter().map(|id| id.as_bytes().to_vec()).collect(),
            }))
        })
        .await
    }

    async fn get_result(
        &self,
        request: Request<pb::GetResultRequest>,
    ) -> Result<Response<pb::GetResultResponse>, Status> {
        track("get_result", async {
            let req = request.into_inner();
            let raw = id32(&req.transaction_id, "transaction_id")?;
            let cancel = CancellationToken::new();
            let result = self
                .index
                .result(TxId::new(raw), &cancel)
                .await
                .map_err(map_err)?;
            let data = dps_types::codec::encode(&result).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetResultResponse {
                transaction_id: req.transaction_id,
                data,
            }))
        })
        .await
    }

    async fn get_seal(
        &self,
        request: Request<pb::GetSealRequest>,
    ) -> Result<Response<pb::GetSealResponse>, Status> {
        track("get_seal", async {
            let req = request.into_inner();
            let raw = id32(&req.seal_id, "seal_id")?;
            let cancel = CancellationToken::new();
            let seal = self.index.seal(SealId::new(raw), &cancel).await.map_err(map_err)?;
            let data = dps_types::codec::encode(&seal).map_err(|e| map_err(e.into()))?;
            Ok(Response::new(pb::GetSealResponse {
                seal_id: req.seal_id,
                data,
            }))
        })
        .await
    }

    async fn list_seals_for_height(
        &self,
        request: Request<pb::ListSealsForHeightRequest>,
    ) -> Result<Response<pb::ListSealsForHeightResponse>, Status> {
        track("list_seals_for_height", async {
            let req = request.into_inner();
            let h = positive_height(req.height, "height")?;
            let cancel = CancellationToken::new();
            let ids = self
                .index
                .seals_by_height(h, &cancel)
                .await
                .map_err(map_err)?;
            Ok(Response::new(pb::ListSealsForHeightResponse {
                height: h,
                seal_ids: ids.iter().map(|id| id.as_bytes().to_vec()).collect(),
            }))
        })
        .await
    }
}

/// Configuration for the gRPC Index Reader server.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct RpcServerConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:8700`.
    pub listen_addr: String,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8700".to_string(),
        }
    }
}

/// Serves the Index Reader gRPC contract on `config.listen_addr` until
/// `shutdown` is cancelled, mirroring the `Server::builder().add_service(..)
/// .serve(addr)` bootstrap the teacher's node binaries use for their own
/// gRPC services.
pub async fn run_server<I: IndexReader + 'static>(
    index: Arc<I>,
    config: RpcServerConfig,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    dps_telemetry::metrics::install();

    let addr = config.listen_addr.parse()?;
    let service = pb::index_reader_service_server::IndexReaderServiceServer::new(RpcServer::new(index));

    tracing::info!(target: "dps-rpc", %addr, "index reader gRPC server listening");
    tonic::transport::Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, async move {
            shutdown.cancelled().await;
            tracing::info!(target: "dps-rpc", "shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dps_test_utils::InMemoryIndex;

    fn server() -> RpcServer<InMemoryIndex> {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(dps_telemetry::metrics::install);
        RpcServer::new(Arc::new(InMemoryIndex::empty()))
    }

    #[tokio::test]
    async fn get_height_for_block_rejects_short_id() {
        let srv = server();
        let req = Request::new(pb::GetHeightForBlockRequest {
            block_id: vec![0u8; 31],
        });
        let err = srv.get_height_for_block(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn get_header_rejects_zero_height() {
        let srv = server();
        let req = Request::new(pb::GetHeaderRequest { height: 0 });
        let err = srv.get_header(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn get_register_values_rejects_empty_paths() {
        let srv = server();
        let req = Request::new(pb::GetRegisterValuesRequest {
            height: 1,
            paths: vec![],
        });
        let err = srv.get_register_values(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }
}
