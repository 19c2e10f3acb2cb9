//! Per-input witnesses and the sparse container that holds them.
//!
//! The container is index-aligned with the input list but may be shorter;
//! missing entries read as empty witnesses, so two containers that differ
//! only in trailing empty entries are equal. A container is null when every
//! entry is empty, and a null container is never written. A stream that
//! sets the witness flag and then carries only empty witnesses is rejected,
//! so "no witnesses" has exactly one encoding.

use std::hash::{Hash, Hasher};

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::encoding::stream::{write_bytes, write_compact_size};
use crate::encoding::{Decodable, DecodeError, Encodable, EncodeError, Reader, SerializeParams};

/// The witness stack of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputWitness {
    pub stack: Vec<Vec<u8>>,
}

impl InputWitness {
    pub fn new(stack: Vec<Vec<u8>>) -> Self {
        Self { stack }
    }

    pub fn is_null(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Encodable for InputWitness {
    fn encode<B: BufMut>(&self, buf: &mut B, _params: SerializeParams) -> Result<(), EncodeError> {
        write_compact_size(buf, self.stack.len() as u64);
        for item in &self.stack {
            write_bytes(buf, item);
        }
        Ok(())
    }
}

impl Decodable for InputWitness {
    fn decode(reader: &mut Reader<'_>, _params: SerializeParams) -> Result<Self, DecodeError> {
        let len = reader.read_vec_len()?;
        let mut stack = Vec::with_capacity(len.min(reader.remaining()));
        for _ in 0..len {
            stack.push(reader.read_bytes()?);
        }
        Ok(Self { stack })
    }
}

/// Witnesses of all inputs, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionWitness {
    inputs: Vec<InputWitness>,
}

impl TransactionWitness {
    pub fn new(inputs: Vec<InputWitness>) -> Self {
        Self { inputs }
    }

    /// Number of stored entries. May be less than the number of inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// `true` when no entries are stored at all.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// `true` when every stored entry is empty.
    pub fn is_null(&self) -> bool {
        self.inputs.iter().all(InputWitness::is_null)
    }

    /// Witness of input `index`; `None` past the stored entries.
    pub fn get(&self, index: usize) -> Option<&InputWitness> {
        self.inputs.get(index)
    }

    /// Stores the witness for input `index`, growing the container with
    /// empty entries as needed.
    pub fn set(&mut self, index: usize, witness: InputWitness) {
        if self.inputs.len() <= index {
            self.inputs.resize_with(index + 1, InputWitness::default);
        }
        self.inputs[index] = witness;
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputWitness> {
        self.inputs.iter()
    }

    /// Stored entries up to the last non-empty one.
    fn significant(&self) -> &[InputWitness] {
        let len = self
            .inputs
            .iter()
            .rposition(|witness| !witness.is_null())
            .map_or(0, |last| last + 1);
        &self.inputs[..len]
    }

    /// Writes exactly `input_count` entries, padding with empty witnesses.
    pub(crate) fn encode_for_inputs<B: BufMut>(
        &self,
        buf: &mut B,
        input_count: usize,
        params: SerializeParams,
    ) -> Result<(), EncodeError> {
        let empty = InputWitness::default();
        for index in 0..input_count {
            self.inputs.get(index).unwrap_or(&empty).encode(buf, params)?;
        }
        Ok(())
    }

    /// Reads exactly `input_count` entries. An all-empty block is a
    /// superfluous record.
    pub(crate) fn decode_for_inputs(
        reader: &mut Reader<'_>,
        input_count: usize,
        params: SerializeParams,
    ) -> Result<Self, DecodeError> {
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(InputWitness::decode(reader, params)?);
        }
        let witness = Self { inputs };
        if witness.is_null() {
            return Err(DecodeError::SuperfluousWitness);
        }
        Ok(witness)
    }
}

impl PartialEq for TransactionWitness {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for TransactionWitness {}

impl Hash for TransactionWitness {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl From<Vec<InputWitness>> for TransactionWitness {
    fn from(inputs: Vec<InputWitness>) -> Self {
        Self::new(inputs)
    }
}
