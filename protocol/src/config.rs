//! # Protocol Configuration & Constants
//!
//! Every magic number the codec and its collaborators agree on lives here.
//! The serialization flag bits and the fee sentinel are consensus-relevant:
//! changing them splits the chain from every other node.
//!
//! [`DecodeLimits`] is the one piece of runtime configuration. The network
//! and storage layers pick the limits; the decoder checks them before it
//! allocates anything sized from an untrusted length prefix.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Serialization Flags
// ---------------------------------------------------------------------------

/// Version-word bit that strips all witness data from the stream. Used when
/// computing the transaction id and signature-hash pre-images.
pub const SERIALIZE_TRANSACTION_NO_WITNESS: i32 = 0x4000_0000;

/// Version-word bit that switches the stream to the host-chain (Bitcoin)
/// subformat: no fee field, no output witnesses, bare 8-byte amounts.
pub const SERIALIZE_BITCOIN_BLOCK_OR_TX: i32 = 0x2000_0000;

/// Extended-format flag bit: one input witness per input follows the outputs.
pub const FLAG_INPUT_WITNESS: u8 = 0x01;

/// Extended-format flag bit: one output witness per output follows the
/// input witnesses.
pub const FLAG_OUTPUT_WITNESS: u8 = 0x02;

/// Fee value reserved to mean "carried in the Bitcoin-compatible subformat,
/// no native fee field". Never a legitimate fee.
pub const TX_FEE_BITCOIN_TX_FLAG: i64 = -42;

// ---------------------------------------------------------------------------
// Transaction Versions & Weight
// ---------------------------------------------------------------------------

/// Default transaction version for newly built transactions.
pub const CURRENT_VERSION: i32 = 1;

/// Highest version relay policy treats as standard.
pub const MAX_STANDARD_VERSION: i32 = 2;

/// Witness bytes are discounted by this factor when computing weight (BIP141).
pub const WITNESS_SCALE_FACTOR: usize = 4;

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Number of base units in one coin.
pub const COIN: i64 = 100_000_000;

/// Upper bound on any single explicit amount. 21 million coins.
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

// ---------------------------------------------------------------------------
// Wire Limits
// ---------------------------------------------------------------------------

/// Largest value a CompactSize length prefix may carry, regardless of the
/// configured limits.
pub const MAX_SIZE: u64 = 0x0200_0000;

/// Serialized length of an explicit confidential value (tag + 8 bytes).
pub const EXPLICIT_VALUE_SIZE: usize = 9;

/// Serialized length of a committed confidential value (tag + 32 bytes).
pub const COMMITTED_VALUE_SIZE: usize = 33;

/// Tag byte of the null confidential value.
pub const NULL_VALUE_TAG: u8 = 0xFF;

// ---------------------------------------------------------------------------
// Signature Cache
// ---------------------------------------------------------------------------

/// Default signature cache budget in MiB. Keeps the cache under ~40MB
/// (over 500k entries on 64-bit systems).
pub const DEFAULT_MAX_SIG_CACHE_SIZE: usize = 40;

/// Approximate heap footprint of one cache entry, used to turn the MiB
/// budget into an entry count.
pub const SIG_CACHE_ENTRY_BYTES: usize = 80;

// ---------------------------------------------------------------------------
// DecodeLimits
// ---------------------------------------------------------------------------

/// Resource bounds applied while decoding untrusted bytes.
///
/// Each length prefix is compared against these limits before the decoder
/// reserves memory for it, so a 5-byte prefix claiming four billion inputs
/// fails immediately instead of exhausting the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum element count of any vector (inputs, outputs, witness stack).
    pub max_vector_len: u64,
    /// Maximum byte length of any single byte string (scripts, proofs).
    pub max_buffer_len: u64,
    /// Maximum total size of one serialized transaction.
    pub max_transaction_size: usize,
}

impl DecodeLimits {
    /// Limits that only enforce the hard CompactSize ceiling. Meant for
    /// trusted sources such as the local block store.
    pub const fn unbounded() -> Self {
        Self {
            max_vector_len: MAX_SIZE,
            max_buffer_len: MAX_SIZE,
            max_transaction_size: MAX_SIZE as usize,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_vector_len: 100_000,
            max_buffer_len: 4_000_000,
            max_transaction_size: 4_000_000,
        }
    }
}
