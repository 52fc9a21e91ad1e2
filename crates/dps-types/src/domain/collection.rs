// Path: crates/dps-types/src/domain/collection.rs
use crate::ids::{CollectionId, TxId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An ordered list of transaction IDs guaranteed together as a unit of a
/// block's payload (`spec.md` §3). `Collection(collID).id == collID` is an
/// Index Reader invariant, not enforced by this type itself.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Collection {
    /// The collection's own content hash.
    pub id: CollectionId,
    /// Transaction IDs, in block-local execution order.
    pub transaction_ids: Vec<TxId>,
}

/// A multi-signer attestation that a collection was seen by verifiers
/// (`spec.md` §3). Keyed by the same `CollectionId` as its `Collection`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Guarantee {
    /// The collection this guarantee attests to.
    pub collection_id: CollectionId,
    /// The 32-byte identities of the collection's signers.
    pub signer_ids: Vec<[u8; 32]>,
    /// The aggregated signature over the collection.
    pub signature: Vec<u8>,
}
