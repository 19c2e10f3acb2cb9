//! # Wire Encoding
//!
//! Little-endian integers, CompactSize length prefixes and length-prefixed
//! byte strings, the same primitives the host chain uses. Every component
//! implements [`Encodable`] and [`Decodable`]; the transaction-level
//! algorithm in [`crate::transaction::codec`] is built from them.
//!
//! ```text
//! error.rs   — DecodeError / EncodeError
//! params.rs  — SerializeParams (no-witness, Bitcoin-compatible switches)
//! stream.rs  — Reader over untrusted bytes, CompactSize and list helpers
//! ```

pub mod error;
pub mod params;
pub mod stream;

use bytes::BufMut;
use tracing::{debug, warn};

use crate::config::DecodeLimits;

pub use error::{DecodeError, EncodeError};
pub use params::SerializeParams;
pub use stream::Reader;

/// Types with a consensus wire encoding.
pub trait Encodable {
    /// Appends the encoding of `self` under `params` to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError>;
}

/// Types that can be read back from their consensus wire encoding.
pub trait Decodable: Sized {
    /// Reads one value from `reader` under `params`.
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError>;
}

/// Serializes `value` into a fresh buffer.
pub fn serialize<T: Encodable>(value: &T, params: SerializeParams) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    if let Err(err) = value.encode(&mut buf, params) {
        warn!(error = %err, ?params, "refusing to serialize");
        return Err(err);
    }
    Ok(buf)
}

/// Decodes exactly one `T` from `bytes`. The total size is checked against
/// `limits` first, and trailing bytes are an error.
pub fn deserialize<T: Decodable>(
    bytes: &[u8],
    params: SerializeParams,
    limits: DecodeLimits,
) -> Result<T, DecodeError> {
    let result = decode_exact(bytes, params, limits);
    if let Err(ref err) = result {
        debug!(error = %err, len = bytes.len(), ?params, "rejected encoding");
    }
    result
}

fn decode_exact<T: Decodable>(
    bytes: &[u8],
    params: SerializeParams,
    limits: DecodeLimits,
) -> Result<T, DecodeError> {
    if bytes.len() > limits.max_transaction_size {
        return Err(DecodeError::OversizedTransaction {
            size: bytes.len(),
            max: limits.max_transaction_size,
        });
    }
    let mut reader = Reader::new(bytes, limits);
    let value = T::decode(&mut reader, params)?;
    reader.finish()?;
    Ok(value)
}
