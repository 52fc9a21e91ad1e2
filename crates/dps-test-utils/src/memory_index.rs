// Path: crates/dps-test-utils/src/memory_index.rs
//! An in-memory `IndexReader` used to exercise `dps-rpc` and `dps-invoker`
//! without a `redb` database on disk, mirroring the role the teacher's
//! `test_utils` crate plays for its own components: a lightweight stand-in
//! that satisfies a real trait contract instead of a hand-rolled mock per
//! call site.

use async_trait::async_trait;
use dps_api::IndexReader;
use dps_types::{
    BlockId, Collection, CollectionId, DpsError, Event, Guarantee, Header, Height, LedgerPath,
    LedgerValue, Seal, SealId, StateCommit, TransactionBody, TransactionResult, TxId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One block's worth of fixture data keyed by height.
#[derive(Default, Clone)]
struct BlockFixture {
    header: Option<Header>,
    commit: Option<StateCommit>,
    collection_ids: Vec<CollectionId>,
    transaction_ids: Vec<TxId>,
    seal_ids: Vec<SealId>,
    events: Vec<Event>,
}

#[derive(Default)]
struct State {
    blocks: HashMap<Height, BlockFixture>,
    block_heights: HashMap<BlockId, Height>,
    tx_heights: HashMap<TxId, Height>,
    registers: HashMap<(Height, LedgerPath), LedgerValue>,
    collections: HashMap<CollectionId, Collection>,
    guarantees: HashMap<CollectionId, Guarantee>,
    transactions: HashMap<TxId, TransactionBody>,
    results: HashMap<TxId, TransactionResult>,
    seals: HashMap<SealId, Seal>,
}

/// An in-memory `IndexReader`, populated via `InMemoryIndex::builder()` or
/// the narrower convenience constructors below. Reads can be forced to fail
/// with `fail_all_reads`, used to assert that a cache serves a second read
/// without calling back into the index.
pub struct InMemoryIndex {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl InMemoryIndex {
    /// An index with nothing indexed: `first()`/`last()` both fail with
    /// `NotIndexed`, and every lookup fails the same way.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(State::default()),
            failing: AtomicBool::new(false),
        }
    }

    /// An index with a single register write: `path` resolves to `value` at
    /// `height` and at every later height, per the same "most recent write
    /// at or before" semantics `dps-index::LocalIndex` implements.
    pub fn with_register(height: Height, path: LedgerPath, value: LedgerValue) -> Self {
        let index = Self::empty();
        index.set_register(height, path, value);
        index
    }

    /// Inserts or overwrites a register write at `height`.
    pub fn set_register(&self, height: Height, path: LedgerPath, value: LedgerValue) {
        let mut state = self.state.lock().unwrap();
        state.registers.insert((height, path), value);
        state.blocks.entry(height).or_default();
    }

    /// Inserts a fully-formed block, wiring up its header, commit, and
    /// reverse-lookup tables.
    pub fn insert_block(&self, header: Header, commit: StateCommit) -> BlockId {
        let block_id = header.id();
        let height = header.height;
        let mut state = self.state.lock().unwrap();
        state.block_heights.insert(block_id, height);
        let fixture = state.blocks.entry(height).or_default();
        fixture.header = Some(header);
        fixture.commit = Some(commit);
        block_id
    }

    /// Attaches a collection/guarantee pair to a height's fixture.
    pub fn insert_collection(&self, height: Height, collection: Collection, guarantee: Guarantee) {
        let mut state = self.state.lock().unwrap();
        let id = collection.id;
        state.collections.insert(id, collection);
        state.guarantees.insert(id, guarantee);
        state.blocks.entry(height).or_default().collection_ids.push(id);
    }

    /// Attaches a transaction body/result pair to a height's fixture.
    pub fn insert_transaction(&self, height: Height, body: TransactionBody, result: TransactionResult) {
        let mut state = self.state.lock().unwrap();
        let id = body.id;
        state.tx_heights.insert(id, height);
        state.transactions.insert(id, body);
        state.results.insert(id, result);
        state.blocks.entry(height).or_default().transaction_ids.push(id);
    }

    /// Attaches a seal to a height's fixture, deriving its `SealId` the same
    /// way `dps-index::LocalIndex` does (a seal carries no embedded hash).
    pub fn insert_seal(&self, height: Height, seal: Seal) -> SealId {
        let seal_id = SealId::new(dps_types::hash::sha256(&dps_types::codec::encode(&seal).unwrap()));
        let mut state = self.state.lock().unwrap();
        state.seals.insert(seal_id, seal);
        state.blocks.entry(height).or_default().seal_ids.push(seal_id);
        seal_id
    }

    /// Appends an event to a height's fixture, in insertion order.
    pub fn insert_event(&self, height: Height, event: Event) {
        let mut state = self.state.lock().unwrap();
        state.blocks.entry(height).or_default().events.push(event);
    }

    /// Forces every subsequent read method to fail with `BackendUnavailable`,
    /// used to assert that a caller's cache serves a value without a second
    /// index round-trip.
    pub fn fail_all_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<(), DpsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DpsError::BackendUnavailable("forced failure".to_string()));
        }
        Ok(())
    }

    fn bounds(state: &State) -> Option<(Height, Height)> {
        let mut heights: Vec<Height> = state.blocks.keys().copied().collect();
        if heights.is_empty() {
            return None;
        }
        heights.sort_unstable();
        Some((heights[0], *heights.last().unwrap()))
    }
}

#[async_trait]
impl IndexReader for InMemoryIndex {
    async fn first(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Self::bounds(&state)
            .map(|(first, _)| first)
            .ok_or_else(|| DpsError::NotIndexed("index is empty".to_string()))
    }

    async fn last(&self, _cancel: &CancellationToken) -> Result<Height, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Self::bounds(&state)
            .map(|(_, last)| last)
            .ok_or_else(|| DpsError::NotIndexed("index is empty".to_string()))
    }

    async fn header(&self, h: Height, _cancel: &CancellationToken) -> Result<Header, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .blocks
            .get(&h)
            .and_then(|b| b.header.clone())
            .ok_or_else(|| DpsError::NotIndexed(format!("no header at height {h}")))
    }

    async fn commit(&self, h: Height, _cancel: &CancellationToken) -> Result<StateCommit, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .blocks
            .get(&h)
            .and_then(|b| b.commit)
            .ok_or_else(|| DpsError::NotIndexed(format!("no commit at height {h}")))
    }

    async fn height_for_block(
        &self,
        block_id: BlockId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .block_heights
            .get(&block_id)
            .copied()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown block {block_id}")))
    }

    async fn values(
        &self,
        h: Height,
        paths: &[LedgerPath],
        _cancel: &CancellationToken,
    ) -> Result<Vec<LedgerValue>, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Ok(paths
            .iter()
            .map(|p| {
                // Most recent write at or before `h`, matching
                // `dps-index::LocalIndex`'s range-scan semantics.
                state
                    .registers
                    .iter()
                    .filter(|((height, path), _)| path == p && *height <= h)
                    .max_by_key(|((height, _), _)| *height)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn collection(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Collection, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(&collection_id)
            .cloned()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown collection {collection_id}")))
    }

    async fn guarantee(
        &self,
        collection_id: CollectionId,
        _cancel: &CancellationToken,
    ) -> Result<Guarantee, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .guarantees
            .get(&collection_id)
            .cloned()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown guarantee {collection_id}")))
    }

    async fn transaction(&self, tx_id: TxId, _cancel: &CancellationToken) -> Result<TransactionBody, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .transactions
            .get(&tx_id)
            .cloned()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown transaction {tx_id}")))
    }

    async fn result(&self, tx_id: TxId, _cancel: &CancellationToken) -> Result<TransactionResult, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .results
            .get(&tx_id)
            .cloned()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown result {tx_id}")))
    }

    async fn height_for_transaction(
        &self,
        tx_id: TxId,
        _cancel: &CancellationToken,
    ) -> Result<Height, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .tx_heights
            .get(&tx_id)
            .copied()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown transaction {tx_id}")))
    }

    async fn collections_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<CollectionId>, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .blocks
            .get(&h)
            .map(|b| b.collection_ids.clone())
            .unwrap_or_default())
    }

    async fn transactions_by_height(
        &self,
        h: Height,
        _cancel: &CancellationToken,
    ) -> Result<Vec<TxId>, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .blocks
            .get(&h)
            .map(|b| b.transaction_ids.clone())
            .unwrap_or_default())
    }

    async fn seals_by_height(&self, h: Height, _cancel: &CancellationToken) -> Result<Vec<SealId>, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        Ok(state.blocks.get(&h).map(|b| b.seal_ids.clone()).unwrap_or_default())
    }

    async fn seal(&self, seal_id: SealId, _cancel: &CancellationToken) -> Result<Seal, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        state
            .seals
            .get(&seal_id)
            .cloned()
            .ok_or_else(|| DpsError::NotIndexed(format!("unknown seal {seal_id}")))
    }

    async fn events(
        &self,
        h: Height,
        types: &[String],
        _cancel: &CancellationToken,
    ) -> Result<Vec<Event>, DpsError> {
        self.check_failing()?;
        let state = self.state.lock().unwrap();
        let all = state.blocks.get(&h).map(|b| b.events.clone()).unwrap_or_default();
        if types.is_empty() {
            return Ok(all);
        }
        Ok(all.into_iter().filter(|e| types.iter().any(|t| t == &e.event_type)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_index_reports_not_indexed() {
        let index = InMemoryIndex::empty();
        let cancel = CancellationToken::new();
        assert!(matches!(index.first(&cancel).await, Err(DpsError::NotIndexed(_))));
    }

    #[tokio::test]
    async fn register_resolves_to_most_recent_write_at_or_before_height() {
        let index = InMemoryIndex::empty();
        let path = LedgerPath::new([1u8; 32]);
        index.set_register(100, path, vec![0x0A, 0x0B]);
        index.set_register(200, path, vec![0x0C, 0x0D]);
        let cancel = CancellationToken::new();

        let at_100 = index.values(100, &[path], &cancel).await.unwrap();
        assert_eq!(at_100, vec![vec![0x0A, 0x0B]]);

        let at_150 = index.values(150, &[path], &cancel).await.unwrap();
        assert_eq!(at_150, vec![vec![0x0A, 0x0B]]);

        let at_200 = index.values(200, &[path], &cancel).await.unwrap();
        assert_eq!(at_200, vec![vec![0x0C, 0x0D]]);
    }

    #[tokio::test]
    async fn missing_path_resolves_to_empty_value() {
        let index = InMemoryIndex::empty();
        let cancel = CancellationToken::new();
        let values = index
            .values(100, &[LedgerPath::new([9u8; 32])], &cancel)
            .await
            .unwrap();
        assert_eq!(values, vec![Vec::<u8>::new()]);
    }

    #[tokio::test]
    async fn fail_all_reads_forces_backend_unavailable() {
        let index = InMemoryIndex::empty();
        index.fail_all_reads();
        let cancel = CancellationToken::new();
        assert!(matches!(
            index.first(&cancel).await,
            Err(DpsError::BackendUnavailable(_))
        ));
    }
}
