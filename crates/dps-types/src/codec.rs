// Path: crates/dps-types/src/codec.rs
//! The canonical, deterministic binary codec used by every server-side
//! marshalling of opaque domain payloads (headers, collections, guarantees,
//! transaction bodies, results, seals, event lists).
//!
//! This module is a thin wrapper around `parity-scale-codec` (SCALE), which
//! gives byte-identical output across runs and machines for the same value —
//! the determinism `spec.md` §4.1 requires. Primitive identifiers (hashes,
//! heights, paths) never pass through this codec; see `crate::convert`.

use crate::error::CodecError;
use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical byte representation.
///
/// Fails only if `T`'s `Encode` impl is itself fallible in a way that
/// surfaces as a panic-free error; in practice this is infallible for the
/// derive-generated impls used throughout this workspace, but the `Result`
/// is kept so callers never need to special-case codec failures.
pub fn encode<T: Encode>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(value.encode())
}

/// Decodes a value from its canonical byte representation.
///
/// Uses `decode_all` so that trailing garbage bytes are rejected rather than
/// silently ignored — a decode that "succeeds" on a truncated or padded
/// buffer would defeat the content-addressing guarantees the rest of the
/// system relies on.
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<T, CodecError> {
    T::decode_all(&mut &*bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// A UTC timestamp with nanosecond precision, encoded canonically so that it
/// round-trips exactly (`spec.md` §4.1, "Time fidelity").
///
/// Represented as seconds-since-epoch plus a nanosecond remainder, the same
/// shape `prost_types::Timestamp` and most wire formats use, so that the
/// RPC layer can convert to/from protobuf without any precision loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct Timestamp {
    /// Seconds since the Unix epoch (may be negative for pre-1970 dates).
    pub seconds: i64,
    /// Nanoseconds within the second, in `[0, 999_999_999]`.
    pub nanos: u32,
}

impl Timestamp {
    /// Builds a `Timestamp`, rejecting an out-of-range nanosecond remainder.
    pub fn new(seconds: i64, nanos: u32) -> Result<Self, CodecError> {
        if nanos > 999_999_999 {
            return Err(CodecError::Encode(format!(
                "nanos {nanos} out of range [0, 999_999_999]"
            )));
        }
        Ok(Self { seconds, nanos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Encode, Decode, Debug, PartialEq, Eq)]
    struct Sample {
        id: u32,
        name: String,
        tags: Vec<u8>,
        stamp: Timestamp,
    }

    #[test]
    fn round_trips_struct() {
        let original = Sample {
            id: 42,
            name: "header-42".to_string(),
            tags: vec![1, 2, 3],
            stamp: Timestamp::new(1_700_000_000, 123_456_789).unwrap(),
        };
        let bytes = encode(&original).unwrap();
        let decoded: Sample = decode(&bytes).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn rejects_truncated_input() {
        let original = Sample {
            id: 7,
            name: "a".repeat(40),
            tags: vec![9; 16],
            stamp: Timestamp::new(0, 0).unwrap(),
        };
        let mut bytes = encode(&original).unwrap();
        bytes.truncate(bytes.len() - 2);
        let err = decode::<Sample>(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let original = Sample {
            id: 1,
            name: "x".to_string(),
            tags: vec![],
            stamp: Timestamp::new(5, 5).unwrap(),
        };
        let mut bytes = encode(&original).unwrap();
        bytes.push(0xff);
        assert!(decode::<Sample>(&bytes).is_err());
    }

    #[test]
    fn timestamp_rejects_invalid_nanos() {
        assert!(Timestamp::new(0, 1_000_000_000).is_err());
        assert!(Timestamp::new(0, 999_999_999).is_ok());
    }
}
