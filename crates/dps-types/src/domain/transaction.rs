// Path: crates/dps-types/src/domain/transaction.rs
use crate::ids::{AccountAddress, BlockId, TxId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A single authorization over a transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TransactionSignature {
    /// The signing account.
    pub signer: AccountAddress,
    /// The index of the key used, for accounts with multiple keys.
    pub key_id: u32,
    /// The raw signature bytes.
    pub signature: Vec<u8>,
}

/// The immutable body of a submitted transaction (`spec.md` §3).
/// `TxBody.id == txID` is an Index Reader invariant derived from this
/// struct's canonical encoding, not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TransactionBody {
    /// This transaction's own content hash.
    pub id: TxId,
    /// The source of the transaction's script.
    pub script: Vec<u8>,
    /// Positional arguments to the script, each already in wire form.
    pub arguments: Vec<Vec<u8>>,
    /// Block IDs this transaction references for expiry/determinism checks.
    pub reference_block_ids: Vec<BlockId>,
    /// Accounts that pay the transaction's fees.
    pub payers: Vec<AccountAddress>,
    /// Accounts authorizing the transaction's effects.
    pub authorizers: Vec<AccountAddress>,
    /// Signatures over the transaction's canonical payload.
    pub signatures: Vec<TransactionSignature>,
}

/// The outcome of executing a single transaction (`spec.md` §3). Exactly one
/// `TransactionResult` exists per indexed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct TransactionResult {
    /// The transaction this result describes.
    pub tx_id: TxId,
    /// Whether execution completed without error.
    pub success: bool,
    /// The VM's error message, if execution failed.
    pub error_message: Option<String>,
    /// Indices into the block's event list contributed by this transaction.
    pub event_indices: Vec<u32>,
}
