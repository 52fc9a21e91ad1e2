// Path: crates/dps-types/src/ids.rs
//! Fixed-length, content-addressed identifiers (`spec.md` §3).
//!
//! Each of these is a distinct 32-byte key space even though the underlying
//! representation is identical, following the teacher's `RootHash`/`NodeHash`
//! pattern in `ioi-api::storage` (two hash newtypes that are never
//! interchangeable even though both wrap `[u8; 32]`).

use crate::error::ConvertError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id32 {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Builds an identifier from a 32-byte array.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Returns the identifier's raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Parses an identifier from a byte slice, rejecting any length
            /// other than exactly 32 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ConvertError> {
                if bytes.len() != 32 {
                    return Err(ConvertError::WrongLength {
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                let mut out = [0u8; 32];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

define_id32!(BlockId, "The 32-byte content hash of a block header.");
define_id32!(StateCommit, "The 32-byte root hash of ledger state after a block executes.");
define_id32!(CollectionId, "The 32-byte content hash of a collection.");
define_id32!(TxId, "The 32-byte content hash of a transaction body.");
define_id32!(SealId, "The 32-byte content hash of a seal.");
define_id32!(LedgerPath, "The 32-byte address of a register in the key-value ledger.");
define_id32!(ResultId, "The 32-byte content hash of a block's execution result, attested by a Seal.");
define_id32!(AccountAddress, "The 32-byte address of an account owning ledger registers.");

/// A block height: a monotonically increasing, unsigned 64-bit index.
pub type Height = u64;

/// Variable-length bytes stored at a `LedgerPath`. Empty denotes an absent
/// register, per `spec.md` §3.
pub type LedgerValue = Vec<u8>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = BlockId::from_slice(&[0u8; 31]).unwrap_err();
        assert_eq!(
            err,
            ConvertError::WrongLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn round_trips() {
        let raw = [7u8; 32];
        let id = BlockId::from_slice(&raw).unwrap();
        assert_eq!(id.as_bytes(), &raw);
    }
}
