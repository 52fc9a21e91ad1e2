// Path: crates/dps-types/src/domain/seal.rs
use crate::ids::{BlockId, ResultId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A finalized attestation that a block's execution result has been checked
/// and committed (`spec.md` §3). At most one accepted seal exists per sealed
/// block, though this type itself does not enforce that — the Index Reader
/// backing store does, by construction of its indices.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Seal {
    /// The block this seal attests to.
    pub block_id: BlockId,
    /// The content hash of the execution result being sealed.
    pub result_id: ResultId,
    /// The aggregated signature of the sealing committee.
    pub aggregated_signature: Vec<u8>,
}
