//! Format-legality checks on frozen transactions.
//!
//! The codec accepts anything that has exactly one encoding. This module
//! adds the structural rules a transaction must also satisfy before relay or
//! block inclusion: aligned issuance bit vectors, valid output values, money
//! range fees and no zero-input transactions (which the wire format cannot
//! tell apart from the extended-format marker). Script execution,
//! signatures and range proofs are checked elsewhere.
//!
//! Checks run cheapest first and stop at the first failure.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::amount::money_range;
use super::builder::Transaction;

/// Structural rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// No inputs. Indistinguishable on the wire from the extended marker.
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    /// A fee outside `0..=MAX_MONEY`.
    #[error("fee {0} out of range")]
    FeeOutOfRange(i64),

    /// An issuance or reissuance bit vector that is neither empty nor one
    /// bit per input.
    #[error("{kind} bits cover {bits} inputs, transaction has {inputs}")]
    MisalignedBits {
        kind: &'static str,
        bits: usize,
        inputs: usize,
    },

    /// Number of records differs from the number of set bits.
    #[error("{kind} records: {records}, set bits: {set_bits}")]
    RecordCountMismatch {
        kind: &'static str,
        records: usize,
        set_bits: usize,
    },

    /// An issuance or reissuance amount that is neither null nor valid.
    #[error("invalid {kind} amount on input {input}")]
    InvalidIssuanceAmount { kind: &'static str, input: usize },

    /// Issuance token counts must be in money range.
    #[error("issuance on input {input} creates {keys} tokens")]
    InvalidIssuanceKeys { input: usize, keys: i64 },

    /// An output whose value is null, opaque, or out of range.
    #[error("invalid value on output {0}")]
    InvalidOutputValue(usize),

    /// A non-coinbase input spending the null outpoint.
    #[error("input {0} spends the null outpoint")]
    NullPrevout(usize),

    /// The coinbase script must be 2 to 100 bytes.
    #[error("coinbase script of {0} bytes")]
    BadCoinbaseLength(usize),

    /// Two inputs spend the same outpoint.
    #[error("input {0} spends an outpoint already spent by this transaction")]
    DuplicateInput(usize),
}

/// Runs every structural check against `tx`.
pub fn check_format(tx: &Transaction) -> Result<(), TransactionError> {
    let result = run_checks(tx);
    if let Err(ref err) = result {
        debug!(txid = %tx.id(), error = %err, "transaction failed format checks");
    }
    result
}

fn run_checks(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.inputs().is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.outputs().is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    if let Some(fee) = tx.fee() {
        if !money_range(fee) {
            return Err(TransactionError::FeeOutOfRange(fee));
        }
    }

    check_bits("issuance", tx.issuance_bits(), tx.issuances().len(), tx.inputs().len())?;
    check_bits(
        "reissuance",
        tx.reissuance_bits(),
        tx.reissuances().len(),
        tx.inputs().len(),
    )?;

    for input in 0..tx.inputs().len() {
        if let Some(issuance) = tx.issuance_for(input) {
            if !issuance.amount.is_null() && !issuance.amount.is_valid() {
                return Err(TransactionError::InvalidIssuanceAmount {
                    kind: "issuance",
                    input,
                });
            }
            for keys in [issuance.inflation_keys, issuance.deflation_keys] {
                if !money_range(keys) {
                    return Err(TransactionError::InvalidIssuanceKeys { input, keys });
                }
            }
        }
        if let Some(reissuance) = tx.reissuance_for(input) {
            if !reissuance.amount.is_valid() {
                return Err(TransactionError::InvalidIssuanceAmount {
                    kind: "reissuance",
                    input,
                });
            }
        }
    }

    for (index, output) in tx.outputs().iter().enumerate() {
        if !output.value.is_valid() {
            return Err(TransactionError::InvalidOutputValue(index));
        }
    }

    if tx.is_coinbase() {
        let len = tx.inputs()[0].unlocking_script.len();
        if !(2..=100).contains(&len) {
            return Err(TransactionError::BadCoinbaseLength(len));
        }
    } else {
        let mut seen = HashSet::with_capacity(tx.inputs().len());
        for (index, input) in tx.inputs().iter().enumerate() {
            if input.previous_output.is_null() {
                return Err(TransactionError::NullPrevout(index));
            }
            if !seen.insert(input.previous_output) {
                return Err(TransactionError::DuplicateInput(index));
            }
        }
    }

    Ok(())
}

fn check_bits(
    kind: &'static str,
    bits: &[bool],
    records: usize,
    inputs: usize,
) -> Result<(), TransactionError> {
    if !bits.is_empty() && bits.len() != inputs {
        return Err(TransactionError::MisalignedBits {
            kind,
            bits: bits.len(),
            inputs,
        });
    }
    let set_bits = bits.iter().filter(|bit| **bit).count();
    if set_bits != records {
        return Err(TransactionError::RecordCountMismatch {
            kind,
            records,
            set_bits,
        });
    }
    Ok(())
}
