// Path: crates/dps-types/src/domain/event.rs
use crate::ids::TxId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A side-effect record emitted by a transaction (`spec.md` §3), ordered
/// first by block-local transaction order, then by `event_index`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Event {
    /// The transaction that emitted this event.
    pub tx_id: TxId,
    /// This event's position within its emitting transaction's event list.
    pub event_index: u32,
    /// The event's type identifier (e.g. `"A.0x1.Contract.Deposit"`).
    pub event_type: String,
    /// The event's canonically-encoded payload.
    pub payload: Vec<u8>,
}
