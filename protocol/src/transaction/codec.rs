//! The transaction wire format.
//!
//! Basic layout (no witness data, or witnesses suppressed):
//!
//! ```text
//! i32        version
//! i64        fee            (absent in the Bitcoin-compatible subformat)
//! [TxIn]     inputs
//! [TxOut]    outputs
//! u32        lock_time
//! ```
//!
//! Extended layout (some witness data present):
//!
//! ```text
//! i32        version
//! i64        fee            (absent in the Bitcoin-compatible subformat)
//! 0x00       empty input list (marker)
//! u8         flags != 0
//! [TxIn]     inputs
//! [TxOut]    outputs
//! if flags & 1: one InputWitness per input
//! if flags & 2: one OutputWitness per output (never in Bitcoin-compatible)
//! u32        lock_time
//! ```
//!
//! The writer derives the flags from the content; the reader refuses flags
//! that do not match content (an all-empty witness block) and flags it does
//! not know. Together these leave one valid encoding per transaction and
//! parameter set.
//!
//! A transaction with zero inputs collides with the marker: the reader takes
//! the byte after an empty input list as the flags byte. Zero-input
//! transactions are refused by [`super::verification`], not here.

use bytes::BufMut;
use tracing::trace;

use super::builder::MutableTransaction;
use super::types::{OutputWitness, TxOut};
use super::witness::TransactionWitness;
use crate::config::{FLAG_INPUT_WITNESS, FLAG_OUTPUT_WITNESS, TX_FEE_BITCOIN_TX_FLAG};
use crate::encoding::stream::{write_compact_size, write_list};
use crate::encoding::{Decodable, DecodeError, Encodable, EncodeError, Reader, SerializeParams};

/// Flags byte the writer emits for `tx` under `params`. Zero means the basic
/// layout.
pub fn compute_flags(tx: &MutableTransaction, params: SerializeParams) -> u8 {
    if !params.allow_witness {
        return 0;
    }
    let mut flags = 0;
    if !tx.witness.is_null() {
        flags |= FLAG_INPUT_WITNESS;
    }
    if !params.bitcoin_compat && has_output_witness(&tx.outputs) {
        flags |= FLAG_OUTPUT_WITNESS;
    }
    flags
}

fn has_output_witness(outputs: &[TxOut]) -> bool {
    outputs.iter().any(|output| !output.witness.is_null())
}

fn write_fee<B: BufMut>(buf: &mut B, fee: Option<i64>) -> Result<(), EncodeError> {
    match fee {
        Some(TX_FEE_BITCOIN_TX_FLAG) => Err(EncodeError::ReservedFee),
        Some(fee) => {
            buf.put_i64_le(fee);
            Ok(())
        }
        // Carried from a Bitcoin-compatible stream: no fee field.
        None => Ok(()),
    }
}

fn read_fee(reader: &mut Reader<'_>) -> Result<i64, DecodeError> {
    match reader.read_i64_le()? {
        TX_FEE_BITCOIN_TX_FLAG => Err(DecodeError::ReservedFee),
        fee => Ok(fee),
    }
}

impl Encodable for MutableTransaction {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        if self.witness.len() > self.inputs.len() {
            return Err(EncodeError::WitnessOverflow {
                witnesses: self.witness.len(),
                inputs: self.inputs.len(),
            });
        }

        buf.put_i32_le(self.version);
        if !params.bitcoin_compat {
            write_fee(buf, self.fee)?;
        }

        let flags = compute_flags(self, params);
        if flags != 0 {
            write_compact_size(buf, 0);
            buf.put_u8(flags);
        }
        write_list(buf, &self.inputs, params)?;
        write_list(buf, &self.outputs, params)?;

        if flags & FLAG_INPUT_WITNESS != 0 {
            self.witness
                .encode_for_inputs(buf, self.inputs.len(), params)?;
        }
        if flags & FLAG_OUTPUT_WITNESS != 0 {
            for output in &self.outputs {
                output.witness.encode(buf, params)?;
            }
        }

        buf.put_u32_le(self.lock_time);
        Ok(())
    }
}

impl Decodable for MutableTransaction {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        let version = reader.read_i32_le()?;
        let fee = if params.bitcoin_compat {
            None
        } else {
            Some(read_fee(reader)?)
        };

        let mut flags = 0u8;
        let mut inputs = reader.read_list(params)?;
        let mut outputs: Vec<TxOut> = Vec::new();
        if inputs.is_empty() && params.allow_witness {
            // Either the extended-format marker or a genuinely empty input
            // list; the next byte decides.
            flags = reader.read_u8()?;
            if flags != 0 {
                inputs = reader.read_list(params)?;
                outputs = reader.read_list(params)?;
            }
        } else {
            outputs = reader.read_list(params)?;
        }

        let mut witness = TransactionWitness::default();
        if flags & FLAG_INPUT_WITNESS != 0 && params.allow_witness {
            flags ^= FLAG_INPUT_WITNESS;
            witness = TransactionWitness::decode_for_inputs(reader, inputs.len(), params)?;
        }

        if flags & FLAG_OUTPUT_WITNESS != 0 && params.allow_witness && !params.bitcoin_compat {
            flags ^= FLAG_OUTPUT_WITNESS;
            let mut any_present = false;
            for output in outputs.iter_mut() {
                output.witness = OutputWitness::decode(reader, params)?;
                any_present |= !output.witness.is_null();
            }
            if !any_present {
                return Err(DecodeError::SuperfluousOutputWitness);
            }
        }

        if flags != 0 {
            return Err(DecodeError::UnknownOptionalData(flags));
        }

        let lock_time = reader.read_u32_le()?;

        trace!(
            version,
            inputs = inputs.len(),
            outputs = outputs.len(),
            has_witness = !witness.is_null(),
            "decoded transaction"
        );

        Ok(MutableTransaction {
            version,
            fee,
            inputs,
            issuance_bits: Vec::new(),
            issuances: Vec::new(),
            reissuance_bits: Vec::new(),
            reissuances: Vec::new(),
            outputs,
            witness,
            lock_time,
        })
    }
}
