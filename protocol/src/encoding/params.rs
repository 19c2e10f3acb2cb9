//! Serialization parameters supplied by the caller.
//!
//! The network layer, the block store and the signature hasher each pick a
//! combination of these two switches based on context. The codec derives
//! everything else (the extended-format flags byte) from the transaction
//! itself.

use serde::{Deserialize, Serialize};

use crate::config::{SERIALIZE_BITCOIN_BLOCK_OR_TX, SERIALIZE_TRANSACTION_NO_WITNESS};

/// Caller-selected switches for one encode or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializeParams {
    /// When `false`, all witness data is stripped on write and never looked
    /// for on read.
    pub allow_witness: bool,
    /// When `true`, the stream uses the host-chain subformat: no fee field,
    /// no output witnesses, bare 8-byte amounts.
    pub bitcoin_compat: bool,
}

impl SerializeParams {
    /// Native format with witnesses. What relay and storage use.
    pub const fn native() -> Self {
        Self {
            allow_witness: true,
            bitcoin_compat: false,
        }
    }

    /// Native format with witnesses stripped. What the txid is computed over.
    pub const fn no_witness() -> Self {
        Self {
            allow_witness: false,
            bitcoin_compat: false,
        }
    }

    /// Host-chain subformat, witnesses allowed.
    pub const fn bitcoin() -> Self {
        Self {
            allow_witness: true,
            bitcoin_compat: true,
        }
    }

    /// Same parameters with witness handling switched off.
    pub const fn without_witness(self) -> Self {
        Self {
            allow_witness: false,
            ..self
        }
    }

    /// Interpret the flag bits of a protocol version word. Bits other than
    /// the two serialization switches are ignored.
    pub const fn from_version_bits(version: i32) -> Self {
        Self {
            allow_witness: version & SERIALIZE_TRANSACTION_NO_WITNESS == 0,
            bitcoin_compat: version & SERIALIZE_BITCOIN_BLOCK_OR_TX != 0,
        }
    }

    /// The flag bits these parameters correspond to.
    pub const fn to_version_bits(self) -> i32 {
        let mut bits = 0;
        if !self.allow_witness {
            bits |= SERIALIZE_TRANSACTION_NO_WITNESS;
        }
        if self.bitcoin_compat {
            bits |= SERIALIZE_BITCOIN_BLOCK_OR_TX;
        }
        bits
    }
}

impl Default for SerializeParams {
    fn default() -> Self {
        Self::native()
    }
}
