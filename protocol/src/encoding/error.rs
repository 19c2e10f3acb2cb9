//! Error types for the wire codec.
//!
//! Decoding and encoding fail for different reasons and are reported by
//! different types. A [`DecodeError`] means the bytes came from someone who
//! does not follow the format; the caller drops the peer or rejects the
//! block. An [`EncodeError`] means our own code asked for something the
//! format cannot express; that is a bug on the calling side.

use thiserror::Error;

/// Failures while turning untrusted bytes into a transaction.
///
/// Every variant is fatal to the parse. Nothing is retried and no partial
/// result is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The stream ended before a fixed-size or length-prefixed field was
    /// complete.
    #[error("truncated stream: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A CompactSize prefix used more bytes than its value requires, or
    /// exceeded the hard size ceiling.
    #[error("non-canonical compact size: {0}")]
    NonCanonicalCompactSize(u64),

    /// A vector length prefix exceeded the configured element limit.
    #[error("vector of {len} elements exceeds limit of {max}")]
    OversizedVector { len: u64, max: u64 },

    /// A byte-string length prefix exceeded the configured byte limit.
    #[error("byte string of {len} bytes exceeds limit of {max}")]
    OversizedBuffer { len: u64, max: u64 },

    /// The whole serialized transaction is larger than allowed.
    #[error("transaction of {size} bytes exceeds limit of {max}")]
    OversizedTransaction { size: usize, max: usize },

    /// The extended-format flags byte still has bits set after every known
    /// optional record was consumed.
    #[error("unknown transaction optional data (flags {0:#04x})")]
    UnknownOptionalData(u8),

    /// The input-witness flag was set but every input witness was empty.
    #[error("superfluous witness record")]
    SuperfluousWitness,

    /// The output-witness flag was set but every output witness was empty.
    #[error("superfluous output witness record")]
    SuperfluousOutputWitness,

    /// A native-format fee field carried the value reserved for
    /// Bitcoin-compatible transactions.
    #[error("fee field carries the reserved Bitcoin-compatibility sentinel")]
    ReservedFee,

    /// Bytes were left over after a complete transaction was decoded.
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    /// A hex-encoded transaction was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded fields could not be written back in native form. Only
    /// reachable if the decoder itself is broken.
    #[error("decoded transaction is not re-encodable: {0}")]
    Unencodable(#[from] EncodeError),
}

/// Failures while serializing a transaction built by local code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The Bitcoin-compatible subformat can only carry plain amounts.
    #[error("value with tag {tag:#04x} is not an amount and cannot be written in Bitcoin-compatible form")]
    NotAnAmount { tag: u8 },

    /// A native fee equal to the compatibility sentinel would be silently
    /// dropped from the stream.
    #[error("fee equals the reserved Bitcoin-compatibility sentinel")]
    ReservedFee,

    /// The witness container holds more entries than there are inputs.
    #[error("{witnesses} input witnesses for {inputs} inputs")]
    WitnessOverflow { witnesses: usize, inputs: usize },
}
