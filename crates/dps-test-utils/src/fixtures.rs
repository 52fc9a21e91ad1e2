// Path: crates/dps-test-utils/src/fixtures.rs
//! Small fixture builders for the domain entities, mirroring the teacher's
//! `TestFixtures`'s role (fixed, reusable sample values) without the
//! file-backed `Fixtures` manager, which this workspace's tests have no use
//! for since nothing here round-trips through the filesystem.

use dps_types::codec::Timestamp;
use dps_types::{
    AccountAddress, BlockId, Collection, CollectionId, Event, Guarantee, Header, Seal,
    TransactionBody, TransactionResult, TransactionSignature, TxId,
};

/// A header at the given height, parented to `BlockId([height - 1; 32])` so
/// a chain of `sample_header` calls satisfies `spec.md` §3's
/// `Header(h).parentID == BlockID(h-1)` invariant when heights are
/// contiguous starting above zero.
pub fn sample_header(height: u64) -> Header {
    let parent_byte = height.saturating_sub(1) as u8;
    Header {
        height,
        parent_id: BlockId::new([parent_byte; 32]),
        timestamp: Timestamp::new(1_700_000_000 + height as i64, 0).unwrap(),
        chain_tag: "flow-testnet".to_string(),
        payload_hash: [height as u8; 32],
    }
}

/// A collection containing `tx_ids`, with its `id` derived the same way
/// `dps-index::LocalIndex`'s ingest path expects: the content hash of its
/// own canonical encoding (computed here with a zeroed placeholder id, then
/// overwritten, since `Collection::id` is a field rather than a method).
pub fn sample_collection(seed: u8, tx_ids: Vec<TxId>) -> Collection {
    Collection {
        id: CollectionId::new([seed; 32]),
        transaction_ids: tx_ids,
    }
}

/// A guarantee attesting to `collection_id`.
pub fn sample_guarantee(collection_id: CollectionId) -> Guarantee {
    Guarantee {
        collection_id,
        signer_ids: vec![[1u8; 32]],
        signature: vec![0xAB; 64],
    }
}

/// A transaction body with a single payer/authorizer and one signature.
pub fn sample_transaction(seed: u8) -> TransactionBody {
    let payer = AccountAddress::new([seed; 32]);
    TransactionBody {
        id: TxId::new([seed; 32]),
        script: b"pub fun main() {}".to_vec(),
        arguments: vec![],
        reference_block_ids: vec![BlockId::new([seed.wrapping_sub(1); 32])],
        payers: vec![payer],
        authorizers: vec![payer],
        signatures: vec![TransactionSignature {
            signer: payer,
            key_id: 0,
            signature: vec![0xCD; 64],
        }],
    }
}

/// A successful result for `tx_id` contributing no events.
pub fn sample_result(tx_id: TxId) -> TransactionResult {
    TransactionResult {
        tx_id,
        success: true,
        error_message: None,
        event_indices: vec![],
    }
}

/// An event emitted by `tx_id` at `event_index`.
pub fn sample_event(tx_id: TxId, event_index: u32, event_type: &str) -> Event {
    Event {
        tx_id,
        event_index,
        event_type: event_type.to_string(),
        payload: vec![event_index as u8; 4],
    }
}

/// A seal attesting to `block_id`.
pub fn sample_seal(block_id: BlockId, seed: u8) -> Seal {
    Seal {
        block_id,
        result_id: dps_types::ResultId::new([seed; 32]),
        aggregated_signature: vec![0xEF; 64],
    }
}
