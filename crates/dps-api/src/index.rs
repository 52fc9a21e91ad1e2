// Path: crates/dps-api/src/index.rs
//! The Index Reader contract (`spec.md` §4.4): the single abstract read
//! interface both the on-disk backend (`dps-index`) and the RPC-based
//! backend (`dps-rpc::RpcClientIndex`) implement. Every method is read-only,
//! idempotent, and referentially transparent for a fixed indexed state.

use async_trait::async_trait;
use dps_types::{
    BlockId, Collection, CollectionId, DpsError, Event, Guarantee, Header, Height, LedgerPath,
    LedgerValue, Seal, SealId, StateCommit, TransactionBody, TransactionResult, TxId,
};
use tokio_util::sync::CancellationToken;

/// Abstract read interface over indexed chain state.
///
/// Both implementations in this workspace (`dps-index::LocalIndex`,
/// `dps-rpc::client::RpcClientIndex`) are `Send + Sync` and are shared
/// behind an `Arc`, following the teacher's `NodeStore`/`async_trait`
/// pattern in `storage/src/redb_epoch_store.rs`.
///
/// Every method takes a `CancellationToken` so that a caller abandoning a
/// request (e.g. an HTTP client disconnecting mid-script-execution) can
/// unwind an in-flight lookup instead of leaving it to run to completion.
#[async_trait]
pub trait IndexReader: Send + Sync {
    /// Lowest indexed height, inclusive.
    async fn first(&self, cancel: &CancellationToken) -> Result<Height, DpsError>;

    /// Highest indexed height, inclusive. Always `>= first()`.
    async fn last(&self, cancel: &CancellationToken) -> Result<Height, DpsError>;

    /// The header at height `h`. `NotIndexed` if `h` is outside `[first, last]`.
    async fn header(&self, h: Height, cancel: &CancellationToken) -> Result<Header, DpsError>;

    /// The state root committed after block `h` executed.
    async fn commit(&self, h: Height, cancel: &CancellationToken) -> Result<StateCommit, DpsError>;

    /// Reverse index from a block's content hash to its height. `NotIndexed`
    /// if `block_id` is unknown.
    async fn height_for_block(
        &self,
        block_id: BlockId,
        cancel: &CancellationToken,
    ) -> Result<Height, DpsError>;

    /// Per-path register lookups at height `h`. Missing paths resolve to an
    /// empty value rather than erroring; the result is positional, so
    /// `result.len() == paths.len()` always holds on success.
    async fn values(
        &self,
        h: Height,
        paths: &[LedgerPath],
        cancel: &CancellationToken,
    ) -> Result<Vec<LedgerValue>, DpsError>;

    /// The collection with the given content hash.
    async fn collection(
        &self,
        collection_id: CollectionId,
        cancel: &CancellationToken,
    ) -> Result<Collection, DpsError>;

    /// The guarantee attesting to the given collection.
    async fn guarantee(
        &self,
        collection_id: CollectionId,
        cancel: &CancellationToken,
    ) -> Result<Guarantee, DpsError>;

    /// The transaction body with the given content hash.
    async fn transaction(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<TransactionBody, DpsError>;

    /// The execution result of the given transaction.
    async fn result(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<TransactionResult, DpsError>;

    /// Reverse index from a transaction's content hash to its block height.
    async fn height_for_transaction(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<Height, DpsError>;

    /// The collection IDs included at height `h`, in block-local order.
    async fn collections_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<CollectionId>, DpsError>;

    /// The transaction IDs included at height `h`, in execution order.
    async fn transactions_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<TxId>, DpsError>;

    /// The seal IDs attesting to height `h`.
    async fn seals_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<SealId>, DpsError>;

    /// The seal with the given content hash.
    async fn seal(&self, seal_id: SealId, cancel: &CancellationToken) -> Result<Seal, DpsError>;

    /// Events emitted at height `h`. With `types` empty, returns every event
    /// at `h`; otherwise returns only events whose type matches any supplied
    /// type. Ordering is stable by `(local-tx-index, event_index)`.
    async fn events(
        &self,
        h: Height,
        types: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Event>, DpsError>;
}

#[async_trait]
impl<T: IndexReader + ?Sized> IndexReader for std::sync::Arc<T> {
    async fn first(&self, cancel: &CancellationToken) -> Result<Height, DpsError> {
        (**self).first(cancel).await
    }

    async fn last(&self, cancel: &CancellationToken) -> Result<Height, DpsError> {
        (**self).last(cancel).await
    }

    async fn header(&self, h: Height, cancel: &CancellationToken) -> Result<Header, DpsError> {
        (**self).header(h, cancel).await
    }

    async fn commit(&self, h: Height, cancel: &CancellationToken) -> Result<StateCommit, DpsError> {
        (**self).commit(h, cancel).await
    }

    async fn height_for_block(
        &self,
        block_id: BlockId,
        cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        (**self).height_for_block(block_id, cancel).await
    }

    async fn values(
        &self,
        h: Height,
        paths: &[LedgerPath],
        cancel: &CancellationToken,
    ) -> Result<Vec<LedgerValue>, DpsError> {
        (**self).values(h, paths, cancel).await
    }

    async fn collection(
        &self,
        collection_id: CollectionId,
        cancel: &CancellationToken,
    ) -> Result<Collection, DpsError> {
        (**self).collection(collection_id, cancel).await
    }

    async fn guarantee(
        &self,
        collection_id: CollectionId,
        cancel: &CancellationToken,
    ) -> Result<Guarantee, DpsError> {
        (**self).guarantee(collection_id, cancel).await
    }

    async fn transaction(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<TransactionBody, DpsError> {
        (**self).transaction(tx_id, cancel).await
    }

    async fn result(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<TransactionResult, DpsError> {
        (**self).result(tx_id, cancel).await
    }

    async fn height_for_transaction(
        &self,
        tx_id: TxId,
        cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        (**self).height_for_transaction(tx_id, cancel).await
    }

    async fn collections_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<CollectionId>, DpsError> {
        (**self).collections_by_height(h, cancel).await
    }

    async fn transactions_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<TxId>, DpsError> {
        (**self).transactions_by_height(h, cancel).await
    }

    async fn seals_by_height(
        &self,
        h: Height,
        cancel: &CancellationToken,
    ) -> Result<Vec<SealId>, DpsError> {
        (**self).seals_by_height(h, cancel).await
    }

    async fn seal(&self, seal_id: SealId, cancel: &CancellationToken) -> Result<Seal, DpsError> {
        (**self).seal(seal_id, cancel).await
    }

    async fn events(
        &self,
        h: Height,
        types: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Event>, DpsError> {
        (**self).events(h, types, cancel).await
    }
}
