// Path: crates/dps-types/src/hash.rs
//! Content-addressing primitives.
//!
//! Every `*Id`/`*Commit` type in this crate is derived from the SHA-256
//! digest of some canonical encoding. Grounded on the teacher's
//! `ioi-crypto::algorithms::hash` module, which reaches for `dcrypt`'s
//! SHA-256 implementation rather than hand-rolling one.

use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::ByteSerializable;

/// Computes the SHA-256 digest of `bytes`, returning it as a fixed 32-byte
/// array suitable for use as a `BlockId`, `CollectionId`, `TxId`, or `SealId`.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = DcryptSha256::digest(bytes).expect("sha256 digest never fails on valid input");
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest.to_bytes());
    out
}
