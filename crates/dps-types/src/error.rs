// Path: crates/dps-types/src/error.rs
//! Error taxonomy shared by every layer of the Data Provider Service.
//!
//! `spec.md` §7 calls for errors that are never wrapped with ambient context,
//! so that a caller can classify them unambiguously. `DpsError` is the single
//! enum every fallible operation in this workspace returns (directly, not
//! boxed or chained) once past its originating crate's own error type.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error,
/// used for logging and for mapping to gRPC status codes at the RPC boundary.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by the canonical codec (`crate::codec`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Encoding a well-typed value failed; this can only be a bug.
    #[error("encode failed: {0}")]
    Encode(String),
    /// Decoding failed because the input was malformed or of unexpected shape.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Errors raised by the converters in `crate::convert`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The input byte slice was not exactly the expected length.
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
    /// A structured key did not decompose into the expected number of parts.
    #[error("expected {expected} key parts, got {actual}")]
    WrongPartCount {
        /// Expected number of parts.
        expected: usize,
        /// Actual number of parts.
        actual: usize,
    },
    /// A literal did not match the expected scalar kind.
    #[error("literal {literal:?} does not match kind {kind}")]
    ScalarMismatch {
        /// The scalar kind that was requested.
        kind: String,
        /// The literal that failed to parse.
        literal: String,
    },
    /// A value was outside the representable range for its kind.
    #[error("value out of range for kind {kind}")]
    OutOfRange {
        /// The scalar kind whose range was violated.
        kind: String,
    },
    /// A Rosetta decimal string contained a non-digit character.
    #[error("non-digit character in decimal string {0:?}")]
    NonDigit(String),
    /// A Rosetta amount was negated by a leading minus sign; amounts are unsigned.
    #[error("signed amounts are not permitted")]
    SignedAmount,
    /// `digits` was shorter than the declared fractional length.
    #[error("digit string shorter than fraction length {fraction_len}")]
    TooFewDigits {
        /// The declared fractional length.
        fraction_len: usize,
    },
    /// The parsed integer overflowed its target representation.
    #[error("value overflowed target representation")]
    Overflow,
}

/// The unified error type returned by the Index Reader contract, the RPC
/// server/client, the Payload Store, and the Script Invoker.
///
/// Per `spec.md` §7 these variants are never wrapped with extra context by
/// intermediate layers; they are propagated as-is.
#[derive(Debug, Error, Clone)]
pub enum DpsError {
    /// The request shape, length, or range was invalid. Always recoverable
    /// by the caller; never logged above debug.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The query targets a height or content hash outside the indexed range.
    #[error("not indexed: {0}")]
    NotIndexed(String),
    /// The backend returned data that failed to decode.
    #[error("corrupted index: {0}")]
    CorruptedIndex(String),
    /// A transient I/O or RPC failure. The core performs no retries.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Encoding or decoding failed on a well-typed value.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// A script failed during execution; carries the VM's own error message.
    #[error("invocation error: {0}")]
    Invocation(String),
    /// Construction-time misconfiguration (e.g. a zero-byte cache budget).
    #[error("config error: {0}")]
    Config(String),
}

impl ErrorCode for DpsError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotIndexed(_) => "NOT_INDEXED",
            Self::CorruptedIndex(_) => "CORRUPTED_INDEX",
            Self::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Codec(_) => "CODEC_ERROR",
            Self::Invocation(_) => "INVOCATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<ConvertError> for DpsError {
    fn from(e: ConvertError) -> Self {
        DpsError::InvalidArgument(e.to_string())
    }
}
