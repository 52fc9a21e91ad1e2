// Path: crates/dps-index/src/local.rs
//! `redb`-backed on-disk implementation of `dps_api::IndexReader`.
//!
//! Content-addressed entities (headers, collections, guarantees,
//! transaction bodies/results, seals) are delegated to an injected
//! `Arc<dyn PayloadStore>`, keyed by their own content hash (or a
//! domain-separated derivation of it, for the handful of entities that
//! share a hash with a sibling entity — a collection and its guarantee
//! both key off `CollectionId`, for instance). Height- and id-indexed
//! lookup tables (which height a block/tx lives at, which collections/
//! transactions/seals occurred at a height, register history) live in a
//! dedicated `redb` database of their own, since none of them are
//! meaningfully content-addressed.

use crate::config::LocalIndexConfig;
use async_trait::async_trait;
use dps_api::{IndexReader, PayloadStore};
use dps_storage::PayloadStoreImpl;
use dps_types::{
    codec, hash::sha256, BlockId, Collection, CollectionId, DpsError, Event, Guarantee, Header,
    Height, LedgerPath, LedgerValue, Seal, SealId, StateCommit, TransactionBody,
    TransactionResult, TxId,
};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const HEIGHT_BLOCK: TableDefinition<u64, &[u8; 32]> = TableDefinition::new("HEIGHT_BLOCK");
const BLOCK_HEIGHT: TableDefinition<&[u8; 32], u64> = TableDefinition::new("BLOCK_HEIGHT");
const HEIGHT_COMMIT: TableDefinition<u64, &[u8; 32]> = TableDefinition::new("HEIGHT_COMMIT");
const TX_HEIGHT: TableDefinition<&[u8; 32], u64> = TableDefinition::new("TX_HEIGHT");
const HEIGHT_COLLECTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("HEIGHT_COLLECTIONS");
const HEIGHT_TRANSACTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("HEIGHT_TRANSACTIONS");
const HEIGHT_SEALS: TableDefinition<u64, &[u8]> = TableDefinition::new("HEIGHT_SEALS");
const HEIGHT_EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("HEIGHT_EVENTS");
const REGISTER_VALUES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("REGISTER_VALUES");
const META: TableDefinition<&str, u64> = TableDefinition::new("META");

const META_FIRST: &str = "first";
const META_LAST: &str = "last";

fn guarantee_key(collection_id: CollectionId) -> [u8; 32] {
    derive_key(collection_id.as_bytes(), b"guarantee")
}

fn result_key(tx_id: TxId) -> [u8; 32] {
    derive_key(tx_id.as_bytes(), b"result")
}

fn derive_key(id: &[u8; 32], domain: &[u8]) -> [u8; 32] {
    sha256(&[id.as_slice(), domain].concat())
}

fn register_key(path: &LedgerPath, height: Height) -> Vec<u8> {
    [path.as_bytes().as_slice(), &height.to_be_bytes()].concat()
}

/// A single block's worth of data to ingest into a [`LocalIndex`].
///
/// Not part of `spec.md`'s Index Reader contract itself — the contract is
/// read-only — but every index needs a write path to be populated by
/// something upstream of this service; this is this workspace's version of
/// that path, used by the indexing fixtures in tests and by whatever
/// upstream component feeds this service in a full deployment.
#[derive(Debug, Clone)]
pub struct BlockIngest {
    /// The block header. Its own `id()` becomes the block's `BlockId`.
    pub header: Header,
    /// The state root committed after this block executed.
    pub commit: StateCommit,
    /// Collections included at this height, paired with their guarantees.
    pub collections: Vec<(Collection, Guarantee)>,
    /// Transactions included at this height, paired with their results.
    pub transactions: Vec<(TransactionBody, TransactionResult)>,
    /// Seals attesting to this height.
    pub seals: Vec<Seal>,
    /// Events emitted at this height, already ordered by
    /// `(local-tx-index, event_index)`.
    pub events: Vec<Event>,
    /// Register writes effective as of this height.
    pub registers: Vec<(LedgerPath, LedgerValue)>,
}

/// The on-disk `IndexReader` implementation (`spec.md` §4.4).
#[derive(Clone)]
pub struct LocalIndex {
    db: Arc<Database>,
    payloads: Arc<PayloadStoreImpl>,
}

impl LocalIndex {
    /// Opens (creating if absent) the index database and its backing
    /// Payload Store.
    pub fn open(config: LocalIndexConfig) -> Result<Self, DpsError> {
        config.validate()?;

        if let Some(parent) = config.index_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            }
        }

        let db = Database::create(&config.index_path)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        {
            let w = db
                .begin_write()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_BLOCK)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(BLOCK_HEIGHT)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_COMMIT)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(TX_HEIGHT)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_COLLECTIONS)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_TRANSACTIONS)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_SEALS)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(HEIGHT_EVENTS)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(REGISTER_VALUES)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.open_table(META)
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            w.commit()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        }

        let payloads = PayloadStoreImpl::open(config.payload_store)?;

        Ok(Self {
            db: Arc::new(db),
            payloads: Arc::new(payloads),
        })
    }

    /// Opens a `LocalIndex` over an already-constructed Payload Store,
    /// useful for tests that want to inspect or pre-seed the store
    /// independently of the index.
    pub fn open_with_payload_store<P: AsRef<Path>>(
        index_path: P,
        payloads: Arc<PayloadStoreImpl>,
    ) -> Result<Self, DpsError> {
        let db = Database::create(index_path.as_ref())
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        {
            let w = db
                .begin_write()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            for result in [
                w.open_table(HEIGHT_BLOCK).map(|_| ()),
                w.open_table(BLOCK_HEIGHT).map(|_| ()),
                w.open_table(HEIGHT_COMMIT).map(|_| ()),
                w.open_table(TX_HEIGHT).map(|_| ()),
                w.open_table(HEIGHT_COLLECTIONS).map(|_| ()),
                w.open_table(HEIGHT_TRANSACTIONS).map(|_| ()),
                w.open_table(HEIGHT_SEALS).map(|_| ()),
                w.open_table(HEIGHT_EVENTS).map(|_| ()),
                w.open_table(REGISTER_VALUES).map(|_| ()),
                w.open_table(META).map(|_| ()),
            ] {
                result.map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            }
            w.commit()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        }
        Ok(Self {
            db: Arc::new(db),
            payloads,
        })
    }

    /// Ingests one block's worth of data, updating every index table and
    /// extending `[first, last]` to include its height.
    pub async fn ingest(&self, block: BlockIngest) -> Result<(), DpsError> {
        let block_id = block.header.id();
        let height = block.header.height;

        self.payloads
            .save(*block_id.as_bytes(), codec::encode(&block.header)?)
            .await?;

        let mut collection_ids = Vec::with_capacity(block.collections.len());
        for (collection, guarantee) in &block.collections {
            collection_ids.push(collection.id);
            self.payloads
                .save(*collection.id.as_bytes(), codec::encode(collection)?)
                .await?;
            self.payloads
                .save(guarantee_key(collection.id), codec::encode(guarantee)?)
                .await?;
        }

        let mut tx_ids = Vec::with_capacity(block.transactions.len());
        for (body, result) in &block.transactions {
            tx_ids.push(body.id);
            self.payloads
                .save(*body.id.as_bytes(), codec::encode(body)?)
                .await?;
            self.payloads
                .save(result_key(body.id), codec::encode(result)?)
                .await?;
        }

        let mut seal_ids = Vec::with_capacity(block.seals.len());
        for seal in &block.seals {
            seal_ids.push(sealid_of(seal));
            self.payloads
                .save(sealid_of(seal).0, codec::encode(seal)?)
                .await?;
        }

        let db = self.db.clone();
        let commit_bytes = *block.commit.as_bytes();
        let block_id_bytes = *block_id.as_bytes();
        let encoded_collections = codec::encode(&collection_ids)?;
        let encoded_transactions = codec::encode(&tx_ids)?;
        let encoded_seals = codec::encode(&seal_ids)?;
        let encoded_events = codec::encode(&block.events)?;
        let tx_heights: Vec<([u8; 32], Height)> =
            tx_ids.iter().map(|id| (*id.as_bytes(), height)).collect();
        let registers = block.registers.clone();

        tokio::task::spawn_blocking(move || -> Result<(), DpsError> {
            let w = db
                .begin_write()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            {
                let mut height_block = w
                    .open_table(HEIGHT_BLOCK)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_block
                    .insert(height, &block_id_bytes)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut block_height = w
                    .open_table(BLOCK_HEIGHT)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                block_height
                    .insert(&block_id_bytes, height)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut height_commit = w
                    .open_table(HEIGHT_COMMIT)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_commit
                    .insert(height, &commit_bytes)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut tx_height = w
                    .open_table(TX_HEIGHT)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                for (tx_id_bytes, h) in &tx_heights {
                    tx_height
                        .insert(tx_id_bytes, *h)
                        .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                }

                let mut height_collections = w
                    .open_table(HEIGHT_COLLECTIONS)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_collections
                    .insert(height, encoded_collections.as_slice())
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut height_transactions = w
                    .open_table(HEIGHT_TRANSACTIONS)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_transactions
                    .insert(height, encoded_transactions.as_slice())
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut height_seals = w
                    .open_table(HEIGHT_SEALS)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_seals
                    .insert(height, encoded_seals.as_slice())
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut height_events = w
                    .open_table(HEIGHT_EVENTS)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                height_events
                    .insert(height, encoded_events.as_slice())
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

                let mut register_values = w
                    .open_table(REGISTER_VALUES)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                for (path, value) in &registers {
                    let key = register_key(path, height);
                    register_values
                        .insert(key.as_slice(), value.as_slice())
                        .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                }

                let mut meta = w
                    .open_table(META)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                let current_first = meta
                    .get(META_FIRST)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
                    .map(|v| v.value());
                if current_first.map_or(true, |first| height < first) {
                    meta.insert(META_FIRST, height)
                        .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                }
                let current_last = meta
                    .get(META_LAST)
                    .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
                    .map(|v| v.value());
                if current_last.map_or(true, |last| height > last) {
                    meta.insert(META_LAST, height)
                        .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
                }
            }
            w.commit()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| DpsError::BackendUnavailable(e.to_string()))??;

        Ok(())
    }

    fn read_meta(&self, key: &str) -> Result<Option<u64>, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(META)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        Ok(table
            .get(key)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| v.value()))
    }

    async fn fetch_payload(&self, hash: [u8; 32]) -> Result<Vec<u8>, DpsError> {
        self.payloads
            .retrieve(hash)
            .await?
            .ok_or_else(|| DpsError::CorruptedIndex(format!("missing payload for {}", hex::encode(hash))))
    }
}

fn sealid_of(seal: &Seal) -> SealId {
    SealId::new(sha256(&codec::encode(seal).expect("seal encode is infallible")))
}

#[async_trait]
impl IndexReader for LocalIndex {
    async fn first(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        self.read_meta(META_FIRST)?
            .ok_or_else(|| DpsError::NotIndexed("index is empty".to_string()))
    }

    async fn last(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        self.read_meta(META_LAST)?
            .ok_or_else(|| DpsError::NotIndexed("index is empty".to_string()))
    }

    async fn header(&self, h: Height, _cancel: &CancellationToken) -> Result<Header, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(HEIGHT_BLOCK)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let block_id_bytes = table
            .get(h)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| *v.value())
            .ok_or_else(|| DpsError::NotIndexed(format!("height {h} not indexed")))?;
        drop(table);
        drop(r);
        let bytes = self.fetch_payload(block_id_bytes).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn commit(&self, h: Height, _cancel: &CancellationToken) -> Result<StateCommit, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(HEIGHT_COMMIT)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        table
            .get(h)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| StateCommit::new(*v.value()))
            .ok_or_else(|| DpsError::NotIndexed(format!("height {h} not indexed")))
    }

    async fn height_for_block(
        &self,
        block_id: BlockId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(BLOCK_HEIGHT)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        table
            .get(block_id.as_bytes())
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| v.value())
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown block {block_id}")))
    }

    async fn values(
        &self,
        h: Height,
        paths: &[LedgerPath],
        _cancel: &CancellationToken,
    ) -> Result<Vec<LedgerValue>, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(REGISTER_VALUES)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;

        let mut values = Vec::with_capacity(paths.len());
        for path in paths {
            let lower = register_key(path, 0);
            let upper = register_key(path, h);
            let found = table
                .range(lower.as_slice()..=upper.as_slice())
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
                .next_back()
                .transpose()
                .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
                .map(|(_, v)| v.value().to_vec());
            values.push(found.unwrap_or_default());
        }
        Ok(values)
    }

    async fn collection(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Collection, DpsError> {
        let bytes = self.fetch_payload(*collection_id.as_bytes()).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn guarantee(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Guarantee, DpsError> {
        let bytes = self.fetch_payload(guarantee_key(collection_id)).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn transaction(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<TransactionBody, DpsError> {
        let bytes = self.fetch_payload(*tx_id.as_bytes()).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn result(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<TransactionResult, DpsError> {
        let bytes = self.fetch_payload(result_key(tx_id)).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn height_for_transaction(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(TX_HEIGHT)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        table
            .get(tx_id.as_bytes())
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| v.value())
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown transaction {tx_id}")))
    }

    async fn collections_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CollectionId>, DpsError> {
        self.read_height_list(HEIGHT_COLLECTIONS, h)
    }

    async fn transactions_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<TxId>, DpsError> {
        self.read_height_list(HEIGHT_TRANSACTIONS, h)
    }

    async fn seals_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SealId>, DpsError> {
        self.read_height_list(HEIGHT_SEALS, h)
    }

    async fn seal(&self, seal_id: SealId, _cancel: &CancellationToken) -> Result<Seal, DpsError> {
        let bytes = self.fetch_payload(*seal_id.as_bytes()).await?;
        codec::decode(&bytes).map_err(DpsError::from)
    }

    async fn events(
        &self,
        h: Height,
        types: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<Event>, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(HEIGHT_EVENTS)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let bytes = table
            .get(h)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| v.value().to_vec())
            .ok_or_else(|| DpsError::NotIndexed(format!("height {h} not indexed")))?;
        let events: Vec<Event> = codec::decode(&bytes)?;
        if types.is_empty() {
            return Ok(events);
        }
        Ok(events
            .into_iter()
            .filter(|event| types.iter().any(|t| t == &event.event_type))
            .collect())
    }
}

impl LocalIndex {
    fn read_height_list<T: parity_scale_codec::Decode>(
        &self,
        table_def: TableDefinition<u64, &'static [u8]>,
        h: Height,
    ) -> Result<Vec<T>, DpsError> {
        let r = self
            .db
            .begin_read()
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let table = r
            .open_table(table_def)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?;
        let bytes = table
            .get(h)
            .map_err(|e| DpsError::BackendUnavailable(e.to_string()))?
            .map(|v| v.value().to_vec())
            .ok_or_else(|| DpsError::NotIndexed(format!("height {h} not indexed")))?;
        codec::decode(&bytes).map_err(DpsError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dps_storage::PayloadStoreConfig;
    use dps_types::codec::Timestamp;
    use dps_types::{AccountAddress, TransactionSignature};
    use std::time::Duration;

    fn config(dir: &tempfile::TempDir) -> LocalIndexConfig {
        LocalIndexConfig {
            index_path: dir.path().join("index.redb"),
            payload_store: PayloadStoreConfig {
                capacity: 64,
                max_in_flight: 4,
                flush_interval: Duration::from_millis(20),
                persist_interval: Duration::from_millis(10),
                kv_path: dir.path().join("payloads.redb"),
            },
        }
    }

    fn sample_block(height: Height, parent: BlockId, path: LedgerPath, value: Vec<u8>) -> BlockIngest {
        let header = Header {
            height,
            parent_id: parent,
            timestamp: Timestamp::new(1_700_000_000 + height as i64, 0).unwrap(),
            chain_tag: "test-chain".to_string(),
            payload_hash: [0u8; 32],
        };
        let tx_body = TransactionBody {
            id: TxId::new(sha256(format!("tx-{height}").as_bytes())),
            script: vec![1, 2, 3],
            arguments: vec![],
            reference_block_ids: vec![parent],
            payers: vec![AccountAddress::new([1u8; 32])],
            authorizers: vec![AccountAddress::new([1u8; 32])],
            signatures: vec![TransactionSignature {
                signer: AccountAddress::new([1u8; 32]),
                key_id: 0,
                signature: vec![9; 8],
            }],
        };
        let tx_result = TransactionResult {
            tx_id: tx_body.id,
            success: true,
            error_message: None,
            event_indices: vec![0],
        };
        let collection = Collection {
            id: CollectionId::new(sha256(format!("coll-{height}").as_bytes())),
            transaction_ids: vec![tx_body.id],
        };
        let guarantee = Guarantee {
            collection_id: collection.id,
            signer_ids: vec![[2u8; 32]],
            signature: vec![8; 8],
        };
        let event = Event {
            tx_id: tx_body.id,
            event_index: 0,
            event_type: "Deposit".to_string(),
            payload: vec![5, 5],
        };
        BlockIngest {
            header,
            commit: StateCommit::new(sha256(format!("commit-{height}").as_bytes())),
            collections: vec![(collection, guarantee)],
            transactions: vec![(tx_body, tx_result)],
            seals: vec![],
            events: vec![event],
            registers: vec![(path, value)],
        }
    }

    #[tokio::test]
    async fn ingest_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open(config(&dir)).unwrap();
        let cancel = CancellationToken::new();
        let path = LedgerPath::new([7u8; 32]);

        let genesis = sample_block(1, BlockId::new([0u8; 32]), path, vec![0x0a, 0x0b]);
        let block_id = genesis.header.id();
        index.ingest(genesis).await.unwrap();

        assert_eq!(index.first(&cancel).await.unwrap(), 1);
        assert_eq!(index.last(&cancel).await.unwrap(), 1);
        assert_eq!(index.header(1, &cancel).await.unwrap().height, 1);
        assert_eq!(index.height_for_block(block_id, &cancel).await.unwrap(), 1);

        let values = index.values(1, &[path], &cancel).await.unwrap();
        assert_eq!(values, vec![vec![0x0a, 0x0b]]);

        let events = index.events(1, &[], &cancel).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "Deposit");
    }

    #[tokio::test]
    async fn register_read_at_historic_height_uses_most_recent_write() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open(config(&dir)).unwrap();
        let cancel = CancellationToken::new();
        let path = LedgerPath::new([7u8; 32]);

        let b100 = sample_block(100, BlockId::new([0u8; 32]), path, vec![0x0a, 0x0b]);
        let id100 = b100.header.id();
        index.ingest(b100).await.unwrap();
        let b200 = sample_block(200, id100, path, vec![0x0c, 0x0d]);
        index.ingest(b200).await.unwrap();

        assert_eq!(
            index.values(100, &[path], &cancel).await.unwrap(),
            vec![vec![0x0a, 0x0b]]
        );
        assert_eq!(
            index.values(200, &[path], &cancel).await.unwrap(),
            vec![vec![0x0c, 0x0d]]
        );
        // A height between the two writes still observes the earlier value.
        assert_eq!(
            index.values(150, &[path], &cancel).await.unwrap(),
            vec![vec![0x0a, 0x0b]]
        );
    }

    #[tokio::test]
    async fn unknown_path_resolves_to_empty_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open(config(&dir)).unwrap();
        let cancel = CancellationToken::new();
        let path = LedgerPath::new([7u8; 32]);
        let other = LedgerPath::new([9u8; 32]);

        index
            .ingest(sample_block(1, BlockId::new([0u8; 32]), path, vec![1, 2]))
            .await
            .unwrap();

        let values = index.values(1, &[other], &cancel).await.unwrap();
        assert_eq!(values, vec![Vec::<u8>::new()]);
    }

    #[tokio::test]
    async fn unindexed_height_is_not_indexed() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalIndex::open(config(&dir)).unwrap();
        let cancel = CancellationToken::new();
        let err = index.header(999, &cancel).await.unwrap_err();
        assert!(matches!(err, DpsError::NotIndexed(_)));
    }
}
