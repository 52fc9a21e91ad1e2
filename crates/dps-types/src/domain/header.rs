// Path: crates/dps-types/src/domain/header.rs
use crate::codec::{self, Timestamp};
use crate::ids::{BlockId, Height};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Block metadata, per `spec.md` §3.
///
/// `Header::id` derives the block's content hash from the header's own
/// canonical encoding; `spec.md` §3 requires `Header(h).height == h` and
/// `Header(h).parentID == BlockID(h-1)` for `h > First`, both of which are
/// invariants the Index Reader enforces when it builds the index, not
/// invariants this type enforces on its own.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Header {
    /// The block height this header describes.
    pub height: Height,
    /// The content hash of the parent block's header.
    pub parent_id: BlockId,
    /// The time the block was finalized, with nanosecond precision.
    pub timestamp: Timestamp,
    /// A human-readable chain identity tag (e.g. `"flow-testnet"`), carried
    /// verbatim through encode/decode.
    pub chain_tag: String,
    /// The content hash of the block's payload (collections + seals), used
    /// to bind the header to its body without embedding the body itself.
    pub payload_hash: [u8; 32],
}

impl Header {
    /// Derives this header's `BlockId` from its canonical encoding.
    pub fn id(&self) -> BlockId {
        BlockId::new(crate::hash::sha256(&self.encode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Header {
        Header {
            height: 42,
            parent_id: BlockId::new([1u8; 32]),
            timestamp: Timestamp::new(1_700_000_000, 123_456_789).unwrap(),
            chain_tag: "flow-testnet".to_string(),
            payload_hash: [2u8; 32],
        }
    }

    #[test]
    fn round_trips_through_codec() {
        let header = sample();
        let bytes = codec::encode(&header).unwrap();
        let decoded: Header = codec::decode(&bytes).unwrap();
        assert_eq!(header, decoded);
        assert_eq!(decoded.chain_tag, "flow-testnet");
        assert_eq!(decoded.timestamp.nanos, 123_456_789);
    }

    #[test]
    fn id_is_deterministic() {
        let header = sample();
        assert_eq!(header.id(), header.id());
        let mut other = sample();
        other.height = 43;
        assert_ne!(header.id(), other.id());
    }
}
