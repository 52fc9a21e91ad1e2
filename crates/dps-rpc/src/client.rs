// Path: crates/dps-rpc/src/client.rs
//! `RpcClientIndex`: an `IndexReader` implementation backed by a remote
//! `pb::IndexReaderService`, for a Data Provider Service instance reading
//! through another instance's RPC surface instead of its own disk.
//!
//! Connection is established lazily (`connect_lazy`), mirroring the
//! teacher's `WorkloadClient::new` in `client/src/workload_client/mod.rs`:
//! a backend that is not yet listening does not prevent constructing the
//! client, only the first call against it.

use crate::pb::{self, index_reader_service_client::IndexReaderServiceClient};
use async_trait::async_trait;
use dps_api::IndexReader;
use dps_types::{
    BlockId, Collection, CollectionId, DpsError, Event, Guarantee, Header, Height, LedgerPath,
    LedgerValue, Seal, SealId, StateCommit, TransactionBody, TransactionResult, TxId,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;

/// Translates a transport-level `tonic::Status` into the unified
/// [`DpsError`] taxonomy.
///
/// Following the teacher's `map_grpc_error`, `InvalidArgument` and
/// `FailedPrecondition` are treated as the remote having validated and
/// rejected the request (propagated as-is); everything else is an
/// infrastructure failure.
fn map_grpc_error(status: tonic::Status) -> DpsError {
    match status.code() {
        tonic::Code::InvalidArgument | tonic::Code::FailedPrecondition => {
            DpsError::InvalidArgument(status.message().to_string())
        }
        tonic::Code::NotFound => DpsError::NotIndexed(status.message().to_string()),
        tonic::Code::DataLoss => DpsError::CorruptedIndex(status.message().to_string()),
        _ => DpsError::BackendUnavailable(status.to_string()),
    }
}

fn decode<T: parity_scale_codec::Decode>(bytes: &[u8]) -> Result<T, DpsError> {
    dps_types::codec::decode(bytes).map_err(DpsError::from)
}

fn id32(bytes: &[u8]) -> Result<[u8; 32], DpsError> {
    if bytes.len() != 32 {
        return Err(DpsError::CorruptedIndex(format!(
            "remote returned {}-byte identifier, expected 32",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// An `IndexReader` over a remote Data Provider Service instance's gRPC
/// surface.
pub struct RpcClientIndex {
    client: Mutex<IndexReaderServiceClient<Channel>>,
}

impl RpcClientIndex {
    /// Connects (lazily) to `endpoint`, e.g. `http://10.0.0.4:9443`.
    pub fn connect_lazy(endpoint: impl Into<String>) -> Result<Self, DpsError> {
        let endpoint = endpoint.into();
        let channel = Channel::from_shared(endpoint)
            .map_err(|e| DpsError::Config(e.to_string()))?
            .connect_lazy();
        Ok(Self {
            client: Mutex::new(IndexReaderServiceClient::new(channel)),
        })
    }
}

#[async_trait]
impl IndexReader for RpcClientIndex {
    async fn first(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_first(pb::GetFirstRequest {})
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(resp.height)
    }

    async fn last(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_last(pb::GetLastRequest {})
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(resp.height)
    }

    async fn header(&self, h: Height, _cancel: &CancellationToken) -> Result<Header, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_header(pb::GetHeaderRequest { height: h })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn commit(&self, h: Height, _cancel: &CancellationToken) -> Result<StateCommit, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_commit(pb::GetCommitRequest { height: h })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(StateCommit::new(id32(&resp.commit)?))
    }

    async fn height_for_block(
        &self,
        block_id: BlockId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_height_for_block(pb::GetHeightForBlockRequest {
                block_id: block_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(resp.height)
    }

    async fn values(
        &self,
        h: Height,
        paths: &[LedgerPath],
        _cancel: &CancellationToken,
    ) -> Result<Vec<LedgerValue>, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_register_values(pb::GetRegisterValuesRequest {
                height: h,
                paths: paths.iter().map(|p| p.as_bytes().to_vec()).collect(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(resp.values)
    }

    async fn collection(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Collection, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_collection(pb::GetCollectionRequest {
                collection_id: collection_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn guarantee(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Guarantee, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_guarantee(pb::GetGuaranteeRequest {
                collection_id: collection_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn transaction(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<TransactionBody, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_transaction(pb::GetTransactionRequest {
                transaction_id: tx_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn result(&self, tx_id: TxId, _cancel: &CancellationToken) -> Result<TransactionResult, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_result(pb::GetResultRequest {
                transaction_id: tx_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn height_for_transaction(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_height_for_transaction(pb::GetHeightForTransactionRequest {
                transaction_id: tx_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        Ok(resp.height)
    }

    async fn collections_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CollectionId>, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .list_collections_for_height(pb::ListCollectionsForHeightRequest { height: h })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        resp.collection_ids
            .iter()
            .map(|raw| id32(raw).map(CollectionId::new))
            .collect()
    }

    async fn transactions_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<TxId>, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .list_transactions_for_height(pb::ListTransactionsForHeightRequest { height: h })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        resp.transaction_ids
            .iter()
            .map(|raw| id32(raw).map(TxId::new))
            .collect()
    }

    async fn seals_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SealId>, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .list_seals_for_height(pb::ListSealsForHeightRequest { height: h })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        resp.seal_ids
            .iter()
            .map(|raw| id32(raw).map(SealId::new))
            .collect()
    }

    async fn seal(&self, seal_id: SealId, _cancel: &CancellationToken) -> Result<Seal, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_seal(pb::GetSealRequest {
                seal_id: seal_id.as_bytes().to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }

    async fn events(
        &self,
        h: Height,
        types: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<Event>, DpsError> {
        let mut client = self.client.lock().await;
        let resp = client
            .get_events(pb::GetEventsRequest {
                height: h,
                types: types.to_vec(),
            })
            .await
            .map_err(map_grpc_error)?
            .into_inner();
        decode(&resp.data)
    }
}
