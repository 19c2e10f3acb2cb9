//! Relay policy helpers: weight, priority and dust.
//!
//! None of this is consensus. Sizes come from the native encoding with and
//! without witness data, as cached on [`Transaction`].

use super::amount::{Amount, FeeRate};
use super::builder::Transaction;
use super::types::TxOut;
use crate::config::WITNESS_SCALE_FACTOR;
use crate::encoding::stream::compact_size_len;

/// `OP_RETURN`. Outputs whose script starts with it can never be spent.
pub const OP_RETURN: u8 = 0x6a;

/// Scripts longer than this can never be executed.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

/// Outpoint, script length, sequence and an estimated signature script.
const SPEND_INPUT_SIZE: usize = 32 + 4 + 1 + 107 + 4;

/// Same as [`SPEND_INPUT_SIZE`] with the signature script discounted as
/// witness data.
const WITNESS_SPEND_INPUT_SIZE: usize = 32 + 4 + 1 + 107 / WITNESS_SCALE_FACTOR + 4;

/// Input overhead ignored by [`calculate_modified_size`]: outpoint,
/// sequence and a one-byte script length.
const INPUT_OVERHEAD: usize = 41;

/// Longest signature script [`calculate_modified_size`] discounts.
const MAX_DISCOUNTED_SCRIPT: usize = 110;

/// `true` if `script` can provably never be spent.
pub fn is_unspendable(script: &[u8]) -> bool {
    script.first() == Some(&OP_RETURN) || script.len() > MAX_SCRIPT_SIZE
}

/// `true` if `script` is a version byte followed by a single push of 2 to
/// 40 bytes.
pub fn is_witness_program(script: &[u8]) -> bool {
    if !(4..=42).contains(&script.len()) {
        return false;
    }
    if script[0] != OP_0 && !(OP_1..=OP_16).contains(&script[0]) {
        return false;
    }
    script[1] as usize + 2 == script.len()
}

/// Weight: witness-stripped bytes count [`WITNESS_SCALE_FACTOR`] times,
/// witness bytes once.
pub fn weight(tx: &Transaction) -> usize {
    tx.stripped_size() * (WITNESS_SCALE_FACTOR - 1) + tx.total_size()
}

/// Weight divided by [`WITNESS_SCALE_FACTOR`], rounded up.
pub fn virtual_size(tx: &Transaction) -> usize {
    weight(tx).div_ceil(WITNESS_SCALE_FACTOR)
}

/// Size used for priority: `tx_size` (or the full size when zero) minus the
/// fixed overhead of each input and up to 110 bytes of its signature
/// script, so spending more inputs is not penalized.
pub fn calculate_modified_size(tx: &Transaction, tx_size: usize) -> usize {
    let mut size = if tx_size == 0 { tx.total_size() } else { tx_size };
    for input in tx.inputs() {
        let offset = INPUT_OVERHEAD + input.unlocking_script.len().min(MAX_DISCOUNTED_SCRIPT);
        if size > offset {
            size -= offset;
        }
    }
    size
}

/// Priority of `tx` given the summed value-age of its inputs.
pub fn compute_priority(tx: &Transaction, input_priority: f64, tx_size: usize) -> f64 {
    let size = calculate_modified_size(tx, tx_size);
    if size == 0 {
        return 0.0;
    }
    input_priority / size as f64
}

impl TxOut {
    /// Smallest amount this output may carry before spending it costs more
    /// than three times its value at `relay_fee`. Unspendable outputs have
    /// no threshold.
    pub fn dust_threshold(&self, relay_fee: FeeRate) -> Amount {
        if is_unspendable(&self.locking_script) {
            return 0;
        }
        let script_len = self.locking_script.len();
        let mut size = self.value.native_len() + compact_size_len(script_len as u64) + script_len;
        size += if is_witness_program(&self.locking_script) {
            WITNESS_SPEND_INPUT_SIZE
        } else {
            SPEND_INPUT_SIZE
        };
        3 * relay_fee.fee_for(size)
    }

    /// `true` when an explicit amount falls under [`Self::dust_threshold`].
    /// Blinded values are never dust, since their amount is unknown.
    pub fn is_dust(&self, relay_fee: FeeRate) -> bool {
        match self.value.amount() {
            Some(amount) => amount < self.dust_threshold(relay_fee),
            None => false,
        }
    }
}

impl Transaction {
    /// See [`weight`].
    pub fn weight(&self) -> usize {
        weight(self)
    }

    /// See [`virtual_size`].
    pub fn virtual_size(&self) -> usize {
        virtual_size(self)
    }

    /// See [`calculate_modified_size`].
    pub fn calculate_modified_size(&self, tx_size: usize) -> usize {
        calculate_modified_size(self, tx_size)
    }

    /// See [`compute_priority`].
    pub fn compute_priority(&self, input_priority: f64, tx_size: usize) -> f64 {
        compute_priority(self, input_priority, tx_size)
    }
}
