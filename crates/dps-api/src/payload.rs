// Path: crates/dps-api/src/payload.rs
//! The write-behind Payload Store contract (`spec.md` §4.3): a cache from
//! 32-byte content hashes to opaque ledger-payload bytes.

use async_trait::async_trait;
use dps_types::DpsError;

/// A write-behind cache from 32-byte content hashes to ledger-payload bytes.
///
/// Dyn-safe so that `dps-index` can hold a `Arc<dyn PayloadStore>` without
/// committing to a concrete backend at compile time — mirrored on the
/// teacher's `NodeStore` trait, which is used the same way behind an `Arc`.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Inserts `payload` under `hash`. Non-blocking under normal load: the
    /// value lands in an in-memory LRU immediately and is durably persisted
    /// by a background task, not by this call.
    async fn save(&self, hash: [u8; 32], payload: Vec<u8>) -> Result<(), DpsError>;

    /// Retrieves the payload stored under `hash`, serving from the in-memory
    /// LRU on a hit and falling back to the on-disk KV store on a miss.
    /// Returns `Ok(None)` when `hash` was never saved, never `NotIndexed` —
    /// callers that need domain-level "not indexed" semantics (the Index
    /// Reader) translate an absent payload themselves.
    async fn retrieve(&self, hash: [u8; 32]) -> Result<Option<Vec<u8>>, DpsError>;

    /// Flushes the in-flight write transaction and drains all queued writes.
    /// Fails with the accumulated write errors, if any, rather than losing
    /// them silently.
    async fn close(&self) -> Result<(), DpsError>;
}

#[async_trait]
impl<T: PayloadStore + ?Sized> PayloadStore for std::sync::Arc<T> {
    async fn save(&self, hash: [u8; 32], payload: Vec<u8>) -> Result<(), DpsError> {
        (**self).save(hash, payload).await
    }

    async fn retrieve(&self, hash: [u8; 32]) -> Result<Option<Vec<u8>>, DpsError> {
        (**self).retrieve(hash).await
    }

    async fn close(&self) -> Result<(), DpsError> {
        (**self).close().await
    }
}
