// Path: crates/dps-types/src/lib.rs
//! Shared domain types, identifiers, canonical codec, and converters for the
//! Data Provider Service workspace.
//!
//! Every other crate in this workspace depends on `dps-types` and nothing
//! else depends on them: it is the single place that defines what a block,
//! collection, transaction, result, seal, and event look like on the wire,
//! and the single place that converts between those wire shapes and the
//! smaller scalar/structured values the RPC and HTTP surfaces accept.

pub mod codec;
pub mod convert;
pub mod domain;
pub mod error;
pub mod hash;
pub mod ids;

pub use domain::{Collection, Event, Guarantee, Header, Seal, TransactionBody, TransactionResult, TransactionSignature};
pub use error::{CodecError, ConvertError, DpsError, ErrorCode};
pub use ids::{AccountAddress, BlockId, CollectionId, Height, LedgerPath, LedgerValue, ResultId, SealId, StateCommit, TxId};
