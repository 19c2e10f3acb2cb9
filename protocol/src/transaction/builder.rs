//! Mutable and frozen transactions.
//!
//! [`MutableTransaction`] is the staging area: every field is public and
//! the fluent `with_*` helpers cover the common construction steps. Calling
//! [`MutableTransaction::freeze`] consumes it and produces a [`Transaction`],
//! which computes its id and witness hash once and exposes read-only
//! accessors from then on. The only way to change a `Transaction` is to
//! [`Transaction::thaw`] it back into a builder and freeze again.

use std::fmt;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::amount::{format_money, Amount};
use super::types::{AssetIssuance, AssetReissuance, TxIn, TxOut};
use super::witness::{InputWitness, TransactionWitness};
use crate::config::{DecodeLimits, CURRENT_VERSION};
use crate::crypto::{double_sha256, Hash256};
use crate::encoding::{
    deserialize, serialize, Decodable, DecodeError, Encodable, EncodeError, Reader,
    SerializeParams,
};

// ---------------------------------------------------------------------------
// MutableTransaction
// ---------------------------------------------------------------------------

/// A transaction under construction.
///
/// `fee` is `None` for transactions carried in the Bitcoin-compatible
/// subformat, which has no fee field. On the native wire `None` means the
/// fee field is omitted.
///
/// `issuance_bits` and `reissuance_bits` are either empty or one flag per
/// input; `issuances` and `reissuances` hold one record per set bit, in
/// input order. These records are kept in memory only and are not part of
/// the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutableTransaction {
    pub version: i32,
    pub fee: Option<Amount>,
    pub inputs: Vec<TxIn>,
    pub issuance_bits: Vec<bool>,
    pub issuances: Vec<AssetIssuance>,
    pub reissuance_bits: Vec<bool>,
    pub reissuances: Vec<AssetReissuance>,
    pub outputs: Vec<TxOut>,
    pub witness: TransactionWitness,
    pub lock_time: u32,
}

impl Default for MutableTransaction {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            fee: Some(0),
            inputs: Vec::new(),
            issuance_bits: Vec::new(),
            issuances: Vec::new(),
            reissuance_bits: Vec::new(),
            reissuances: Vec::new(),
            outputs: Vec::new(),
            witness: TransactionWitness::default(),
            lock_time: 0,
        }
    }
}

impl MutableTransaction {
    /// An empty transaction at [`CURRENT_VERSION`] with a zero fee.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Drops the fee field, marking the transaction as Bitcoin-compatible.
    pub fn without_fee(mut self) -> Self {
        self.fee = None;
        self
    }

    pub fn with_input(mut self, input: TxIn) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: TxOut) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    /// Attaches an issuance to input `input_index`, replacing any issuance
    /// already there.
    pub fn with_issuance(mut self, input_index: usize, issuance: AssetIssuance) -> Self {
        let slot = mark_input(&mut self.issuance_bits, self.inputs.len(), input_index);
        if slot.replaced {
            self.issuances[slot.position] = issuance;
        } else {
            self.issuances.insert(slot.position, issuance);
        }
        self
    }

    /// Attaches a reissuance to input `input_index`, replacing any
    /// reissuance already there.
    pub fn with_reissuance(mut self, input_index: usize, reissuance: AssetReissuance) -> Self {
        let slot = mark_input(&mut self.reissuance_bits, self.inputs.len(), input_index);
        if slot.replaced {
            self.reissuances[slot.position] = reissuance;
        } else {
            self.reissuances.insert(slot.position, reissuance);
        }
        self
    }

    /// Sets the witness of input `index`.
    pub fn set_input_witness(&mut self, index: usize, witness: InputWitness) {
        self.witness.set(index, witness);
    }

    /// The issuance attached to input `input_index`, if any.
    pub fn issuance_for(&self, input_index: usize) -> Option<&AssetIssuance> {
        record_for(&self.issuance_bits, &self.issuances, input_index)
    }

    /// The reissuance attached to input `input_index`, if any.
    pub fn reissuance_for(&self, input_index: usize) -> Option<&AssetReissuance> {
        record_for(&self.reissuance_bits, &self.reissuances, input_index)
    }

    /// Id of the transaction as it stands now. Computed on every call.
    pub fn compute_id(&self) -> Result<Hash256, EncodeError> {
        hash_encoding(self, SerializeParams::no_witness()).map(|(id, _)| id)
    }

    /// Freezes the builder, computing the cached hashes.
    ///
    /// Fails if the transaction cannot be written in the native format: a
    /// fee equal to the compatibility sentinel, or more witnesses than
    /// inputs.
    pub fn freeze(self) -> Result<Transaction, EncodeError> {
        Transaction::try_from(self)
    }
}

/// Double-SHA256 of the encoding under `params`, with the encoded length.
/// The id uses [`SerializeParams::no_witness`], the witness hash
/// [`SerializeParams::native`].
fn hash_encoding(
    tx: &MutableTransaction,
    params: SerializeParams,
) -> Result<(Hash256, usize), EncodeError> {
    let bytes = serialize(tx, params)?;
    Ok((double_sha256(&bytes), bytes.len()))
}

struct BitSlot {
    position: usize,
    replaced: bool,
}

/// Sets the bit for `input_index`, sizing the bit vector to the inputs.
/// Returns where the matching record sits among the set bits.
fn mark_input(bits: &mut Vec<bool>, input_count: usize, input_index: usize) -> BitSlot {
    let len = input_count.max(input_index + 1);
    if bits.len() < len {
        bits.resize(len, false);
    }
    let position = bits[..input_index].iter().filter(|bit| **bit).count();
    let replaced = bits[input_index];
    bits[input_index] = true;
    BitSlot { position, replaced }
}

fn record_for<'a, T>(bits: &[bool], records: &'a [T], input_index: usize) -> Option<&'a T> {
    if !bits.get(input_index).copied().unwrap_or(false) {
        return None;
    }
    let position = bits[..input_index].iter().filter(|bit| **bit).count();
    records.get(position)
}

impl From<Transaction> for MutableTransaction {
    fn from(tx: Transaction) -> Self {
        tx.inner
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A frozen transaction with cached hashes.
///
/// Two transactions are equal when their ids are equal. Witness data does
/// not take part in the id, so transactions that differ only in witnesses
/// compare equal; compare [`Transaction::witness_hash`] to tell them apart.
#[derive(Debug, Clone)]
pub struct Transaction {
    inner: MutableTransaction,
    id: Hash256,
    witness_hash: Hash256,
    stripped_size: usize,
    total_size: usize,
}

impl TryFrom<MutableTransaction> for Transaction {
    type Error = EncodeError;

    fn try_from(inner: MutableTransaction) -> Result<Self, Self::Error> {
        let (id, stripped_size) = hash_encoding(&inner, SerializeParams::no_witness())?;
        let (witness_hash, total_size) = hash_encoding(&inner, SerializeParams::native())?;
        Ok(Self {
            id,
            witness_hash,
            stripped_size,
            total_size,
            inner,
        })
    }
}

impl Transaction {
    /// Decodes a transaction from a complete byte string.
    pub fn from_bytes(
        bytes: &[u8],
        params: SerializeParams,
        limits: DecodeLimits,
    ) -> Result<Self, DecodeError> {
        deserialize(bytes, params, limits)
    }

    /// Decodes a native-format transaction from hex.
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes, SerializeParams::native(), DecodeLimits::default())
    }

    /// Serializes under `params`.
    pub fn to_bytes(&self, params: SerializeParams) -> Result<Vec<u8>, EncodeError> {
        serialize(self, params)
    }

    /// Native encoding as hex.
    pub fn to_hex(&self) -> Result<String, EncodeError> {
        self.to_bytes(SerializeParams::native()).map(hex::encode)
    }

    /// Hash of the witness-stripped native encoding. Outpoints reference
    /// transactions by this id.
    pub fn id(&self) -> &Hash256 {
        &self.id
    }

    /// Hash of the full native encoding, witnesses included.
    pub fn witness_hash(&self) -> &Hash256 {
        &self.witness_hash
    }

    /// Length of the native encoding without witness data.
    pub fn stripped_size(&self) -> usize {
        self.stripped_size
    }

    /// Length of the native encoding with witness data.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn version(&self) -> i32 {
        self.inner.version
    }

    pub fn fee(&self) -> Option<Amount> {
        self.inner.fee
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.inner.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.inner.outputs
    }

    pub fn witness(&self) -> &TransactionWitness {
        &self.inner.witness
    }

    pub fn lock_time(&self) -> u32 {
        self.inner.lock_time
    }

    pub fn issuance_bits(&self) -> &[bool] {
        &self.inner.issuance_bits
    }

    pub fn issuances(&self) -> &[AssetIssuance] {
        &self.inner.issuances
    }

    pub fn reissuance_bits(&self) -> &[bool] {
        &self.inner.reissuance_bits
    }

    pub fn reissuances(&self) -> &[AssetReissuance] {
        &self.inner.reissuances
    }

    pub fn issuance_for(&self, input_index: usize) -> Option<&AssetIssuance> {
        self.inner.issuance_for(input_index)
    }

    pub fn reissuance_for(&self, input_index: usize) -> Option<&AssetReissuance> {
        self.inner.reissuance_for(input_index)
    }

    /// `true` for a transaction with no inputs and no outputs.
    pub fn is_null(&self) -> bool {
        self.inner.inputs.is_empty() && self.inner.outputs.is_empty()
    }

    /// A coinbase has exactly one input, spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inner.inputs.len() == 1 && self.inner.inputs[0].previous_output.is_null()
    }

    /// `true` when the transaction was carried in the Bitcoin-compatible
    /// subformat (no fee field).
    pub fn is_bitcoin_compatible(&self) -> bool {
        self.inner.fee.is_none()
    }

    /// Borrow the underlying fields.
    pub fn as_mutable(&self) -> &MutableTransaction {
        &self.inner
    }

    /// Gives the fields back for modification. The hashes are recomputed on
    /// the next freeze.
    pub fn thaw(self) -> MutableTransaction {
        self.inner
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl Encodable for Transaction {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        self.inner.encode(buf, params)
    }
}

impl Decodable for Transaction {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        let inner = MutableTransaction::decode(reader, params)?;
        // A decoded transaction never carries the reserved fee and has
        // exactly one witness slot per input, so this cannot fail.
        Transaction::try_from(inner).map_err(DecodeError::from)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.to_hex();
        write!(f, "Transaction(id={}, version={}, ", &id[..10], self.version())?;
        match self.fee() {
            Some(fee) => write!(f, "fee={}, ", format_money(fee))?,
            None => write!(f, "fee=none, ")?,
        }
        writeln!(
            f,
            "inputs={}, outputs={}, lock_time={})",
            self.inputs().len(),
            self.outputs().len(),
            self.lock_time()
        )?;
        for input in self.inputs() {
            writeln!(f, "    {}", input)?;
        }
        for witness in self.witness().iter() {
            let items: Vec<String> = witness.stack.iter().map(hex::encode).collect();
            writeln!(f, "    witness [{}]", items.join(" "))?;
        }
        for output in self.outputs() {
            writeln!(f, "    {}", output)?;
        }
        Ok(())
    }
}
