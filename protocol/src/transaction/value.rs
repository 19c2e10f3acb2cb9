//! Confidential values.
//!
//! An output value is either a plain amount or a 33-byte curve-point
//! commitment that hides the amount. On the wire the first byte is always
//! the discriminant and decides how many payload bytes follow:
//!
//! ```text
//! tag          payload          variant
//! 0x00, 0x01   8 bytes (BE)     Bitcoin / Explicit amount
//! 0x02, 0x03   none             Opaque (reserved, historical)
//! 0x08, 0x09   32 bytes         Committed
//! 0xFF         none             Null
//! other        none             Opaque
//! ```
//!
//! In the Bitcoin-compatible subformat the tag disappears and the value is a
//! bare little-endian `i64`; only amounts can be written that way.
//!
//! A [`ConfidentialValue::Bitcoin`] amount is always written in that bare
//! form, in native streams too. A transaction carried from the host chain
//! therefore re-encodes natively to its original bytes and keeps its
//! host-chain id. Such a stream has to be read back in the
//! Bitcoin-compatible subformat.
//!
//! The range proof and nonce commitment that accompany a commitment are not
//! part of the value. They travel in the output witness
//! ([`super::types::OutputWitness`]).

use std::fmt;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::amount::{money_range, Amount};
use crate::config::{COMMITTED_VALUE_SIZE, EXPLICIT_VALUE_SIZE, NULL_VALUE_TAG};
use crate::encoding::{Decodable, DecodeError, Encodable, EncodeError, Reader, SerializeParams};

/// Tag of an amount adopted from a Bitcoin-compatible stream.
pub const TAG_BITCOIN_AMOUNT: u8 = 0x00;
/// Size of a bare little-endian amount.
pub const BITCOIN_VALUE_SIZE: usize = 8;
/// Tag of a native explicit amount.
pub const TAG_EXPLICIT: u8 = 0x01;
/// Tags of committed values (the parity of the curve point's y coordinate).
pub const TAG_COMMITTED_EVEN: u8 = 0x08;
pub const TAG_COMMITTED_ODD: u8 = 0x09;

/// An output or issuance value, explicit or committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidentialValue {
    /// Uninitialized value, tag `0xFF`.
    #[default]
    Null,
    /// Amount read from a Bitcoin-compatible stream, tag `0x00`. Written
    /// as a bare little-endian `i64` in every mode.
    Bitcoin(Amount),
    /// Native explicit amount, tag `0x01`.
    Explicit(Amount),
    /// Pedersen commitment, tag `0x08` or `0x09` followed by 32 bytes.
    Committed { prefix: u8, point: [u8; 32] },
    /// A tag with no payload: the reserved `0x02`/`0x03`, or any tag this
    /// codec does not recognize. Never holds `0x00`, `0x01`, `0x08`, `0x09`
    /// or `0xFF`.
    Opaque(u8),
}

impl ConfidentialValue {
    /// A native explicit amount.
    pub fn explicit(amount: Amount) -> Self {
        Self::Explicit(amount)
    }

    /// A commitment from its 33-byte serialization. Returns `None` unless the
    /// first byte is a commitment tag.
    pub fn committed(bytes: [u8; COMMITTED_VALUE_SIZE]) -> Option<Self> {
        match bytes[0] {
            TAG_COMMITTED_EVEN | TAG_COMMITTED_ODD => {
                let mut point = [0u8; 32];
                point.copy_from_slice(&bytes[1..]);
                Some(Self::Committed {
                    prefix: bytes[0],
                    point,
                })
            }
            _ => None,
        }
    }

    /// The discriminant byte.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Null => NULL_VALUE_TAG,
            Self::Bitcoin(_) => TAG_BITCOIN_AMOUNT,
            Self::Explicit(_) => TAG_EXPLICIT,
            Self::Committed { prefix, .. } => *prefix,
            Self::Opaque(tag) => *tag,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for both native and Bitcoin-compatible explicit amounts.
    pub fn is_amount(&self) -> bool {
        matches!(self, Self::Bitcoin(_) | Self::Explicit(_))
    }

    pub fn is_commitment(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// The plain amount, if this value is one.
    pub fn amount(&self) -> Option<Amount> {
        match self {
            Self::Bitcoin(amount) | Self::Explicit(amount) => Some(*amount),
            _ => None,
        }
    }

    /// Explicit amounts in money range and well-formed commitments are valid;
    /// null and opaque values are not.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Bitcoin(amount) | Self::Explicit(amount) => money_range(*amount),
            Self::Committed { prefix, .. } => {
                matches!(*prefix, TAG_COMMITTED_EVEN | TAG_COMMITTED_ODD)
            }
            Self::Null | Self::Opaque(_) => false,
        }
    }

    /// The native serialization: tag byte followed by the payload.
    pub fn to_native_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.native_len());
        self.write_native(&mut out);
        out
    }

    /// Length of the native serialization.
    pub fn native_len(&self) -> usize {
        match self {
            Self::Bitcoin(_) => BITCOIN_VALUE_SIZE,
            Self::Explicit(_) => EXPLICIT_VALUE_SIZE,
            Self::Committed { .. } => COMMITTED_VALUE_SIZE,
            Self::Null | Self::Opaque(_) => 1,
        }
    }

    fn write_native<B: BufMut>(&self, buf: &mut B) {
        if let Self::Bitcoin(amount) = self {
            buf.put_i64_le(*amount);
            return;
        }
        buf.put_u8(self.tag());
        match self {
            Self::Explicit(amount) => buf.put_i64(*amount),
            Self::Committed { point, .. } => buf.put_slice(point),
            Self::Bitcoin(_) | Self::Null | Self::Opaque(_) => {}
        }
    }

    fn read_native(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let tag = reader.read_u8()?;
        let value = match tag {
            TAG_BITCOIN_AMOUNT => Self::Bitcoin(reader.read_i64_be()?),
            TAG_EXPLICIT => Self::Explicit(reader.read_i64_be()?),
            TAG_COMMITTED_EVEN | TAG_COMMITTED_ODD => Self::Committed {
                prefix: tag,
                point: reader.read_array::<32>()?,
            },
            NULL_VALUE_TAG => Self::Null,
            // 0x02/0x03 and unrecognized tags: a bare one-byte encoding.
            other => Self::Opaque(other),
        };
        Ok(value)
    }
}

impl Encodable for ConfidentialValue {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        if params.bitcoin_compat {
            let amount = self
                .amount()
                .ok_or(EncodeError::NotAnAmount { tag: self.tag() })?;
            buf.put_i64_le(amount);
        } else {
            self.write_native(buf);
        }
        Ok(())
    }
}

impl Decodable for ConfidentialValue {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        if params.bitcoin_compat {
            Ok(Self::Bitcoin(reader.read_i64_le()?))
        } else {
            Self::read_native(reader)
        }
    }
}

impl fmt::Display for ConfidentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bitcoin(amount) | Self::Explicit(amount) => {
                write!(f, "{}", super::amount::format_money(*amount))
            }
            Self::Committed { prefix, point } => {
                write!(f, "commitment({:02x}{})", prefix, hex::encode(&point[..4]))
            }
            Self::Opaque(tag) => write!(f, "opaque({:#04x})", tag),
        }
    }
}
