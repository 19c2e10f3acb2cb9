//! Transaction component types.
//!
//! Outpoints, inputs, outputs, the per-output witness that carries range
//! proofs, and the asset issuance/reissuance records attached to inputs.
//! Each wire-visible component implements [`Encodable`] and [`Decodable`];
//! the transaction-level layout is in [`super::codec`].

use std::cmp::Ordering;
use std::fmt;

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::value::ConfidentialValue;
use crate::crypto::Hash256;
use crate::encoding::stream::write_bytes;
use crate::encoding::{Decodable, DecodeError, Encodable, EncodeError, Reader, SerializeParams};

// ---------------------------------------------------------------------------
// OutPoint
// ---------------------------------------------------------------------------

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Id of the transaction that created the output.
    pub txid: Hash256,
    /// Position of the output in that transaction.
    pub index: u32,
}

impl OutPoint {
    pub const fn new(txid: Hash256, index: u32) -> Self {
        Self { txid, index }
    }

    /// The null outpoint: zero txid, index `0xFFFFFFFF`. Spent by coinbase
    /// inputs.
    pub const fn null() -> Self {
        Self {
            txid: Hash256::ZERO,
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.index == u32::MAX
    }
}

impl Default for OutPoint {
    fn default() -> Self {
        Self::null()
    }
}

impl Ord for OutPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.txid
            .cmp(&other.txid)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for OutPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

impl Encodable for OutPoint {
    fn encode<B: BufMut>(&self, buf: &mut B, _params: SerializeParams) -> Result<(), EncodeError> {
        buf.put_slice(self.txid.as_bytes());
        buf.put_u32_le(self.index);
        Ok(())
    }
}

impl Decodable for OutPoint {
    fn decode(reader: &mut Reader<'_>, _params: SerializeParams) -> Result<Self, DecodeError> {
        let txid = Hash256(reader.read_array::<32>()?);
        let index = reader.read_u32_le()?;
        Ok(Self { txid, index })
    }
}

// ---------------------------------------------------------------------------
// TxIn
// ---------------------------------------------------------------------------

/// A relative lock-time decoded from an input's sequence number (BIP68).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeLockTime {
    /// Number of blocks that must pass after the spent output confirmed.
    Blocks(u16),
    /// Number of seconds, always a multiple of 512.
    Seconds(u32),
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// Script satisfying the spent output's locking script.
    pub unlocking_script: Vec<u8>,
    /// Sequence number; see the `SEQUENCE_*` constants.
    pub sequence: u32,
}

impl TxIn {
    /// Setting every input's sequence to this value disables lock-time.
    pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

    /// If set, the sequence is not interpreted as a relative lock-time.
    pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

    /// If set, the relative lock-time is in units of 512 seconds, otherwise
    /// in blocks.
    pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

    /// Bits of the sequence that carry the relative lock-time magnitude.
    pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_FFFF;

    /// Time-based relative lock-times are shifted left by this many bits
    /// (granularity of 512 seconds).
    pub const SEQUENCE_LOCKTIME_GRANULARITY: u32 = 9;

    /// An input spending `previous_output` with an empty script and a final
    /// sequence.
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            unlocking_script: Vec::new(),
            sequence: Self::SEQUENCE_FINAL,
        }
    }

    pub fn with_script(mut self, script: Vec<u8>) -> Self {
        self.unlocking_script = script;
        self
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Relative lock-time encoded in the sequence, or `None` when the
    /// disable flag is set.
    pub fn relative_lock_time(&self) -> Option<RelativeLockTime> {
        if self.sequence & Self::SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return None;
        }
        let magnitude = self.sequence & Self::SEQUENCE_LOCKTIME_MASK;
        if self.sequence & Self::SEQUENCE_LOCKTIME_TYPE_FLAG != 0 {
            Some(RelativeLockTime::Seconds(
                magnitude << Self::SEQUENCE_LOCKTIME_GRANULARITY,
            ))
        } else {
            Some(RelativeLockTime::Blocks(magnitude as u16))
        }
    }
}

impl fmt::Display for TxIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxIn({}", self.previous_output)?;
        if self.previous_output.is_null() {
            write!(f, ", coinbase {}", hex::encode(&self.unlocking_script))?;
        } else {
            let shown = &self.unlocking_script[..self.unlocking_script.len().min(24)];
            write!(f, ", script={}", hex::encode(shown))?;
        }
        if self.sequence != Self::SEQUENCE_FINAL {
            write!(f, ", sequence={}", self.sequence)?;
        }
        write!(f, ")")
    }
}

impl Encodable for TxIn {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        self.previous_output.encode(buf, params)?;
        write_bytes(buf, &self.unlocking_script);
        buf.put_u32_le(self.sequence);
        Ok(())
    }
}

impl Decodable for TxIn {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        Ok(Self {
            previous_output: OutPoint::decode(reader, params)?,
            unlocking_script: reader.read_bytes()?,
            sequence: reader.read_u32_le()?,
        })
    }
}

// ---------------------------------------------------------------------------
// OutputWitness
// ---------------------------------------------------------------------------

/// Range proof and nonce commitment for a committed output value.
///
/// Serialized apart from the output so the Bitcoin-compatible subformat can
/// leave it out. Under that subformat it is neither written nor read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputWitness {
    /// Proof that the committed value lies in the valid range.
    pub range_proof: Vec<u8>,
    /// Nonce commitment the receiver uses to recover the value via ECDH.
    pub nonce_commitment: Vec<u8>,
}

impl OutputWitness {
    pub fn is_null(&self) -> bool {
        self.range_proof.is_empty() && self.nonce_commitment.is_empty()
    }
}

impl Encodable for OutputWitness {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        if !params.bitcoin_compat {
            write_bytes(buf, &self.range_proof);
            write_bytes(buf, &self.nonce_commitment);
        }
        Ok(())
    }
}

impl Decodable for OutputWitness {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        if params.bitcoin_compat {
            return Ok(Self::default());
        }
        Ok(Self {
            range_proof: reader.read_bytes()?,
            nonce_commitment: reader.read_bytes()?,
        })
    }
}

// ---------------------------------------------------------------------------
// TxOut
// ---------------------------------------------------------------------------

/// A transaction output.
///
/// The wire encoding of a `TxOut` covers `value` and `locking_script`;
/// `witness` is written in the witness section of the extended format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOut {
    pub value: ConfidentialValue,
    pub locking_script: Vec<u8>,
    pub witness: OutputWitness,
}

impl TxOut {
    pub fn new(value: ConfidentialValue, locking_script: Vec<u8>) -> Self {
        Self {
            value,
            locking_script,
            witness: OutputWitness::default(),
        }
    }

    /// An explicit-amount output.
    pub fn explicit(amount: Amount, locking_script: Vec<u8>) -> Self {
        Self::new(ConfidentialValue::explicit(amount), locking_script)
    }

    /// The null output: null value, empty script.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null() && self.locking_script.is_empty()
    }

    pub fn with_witness(mut self, witness: OutputWitness) -> Self {
        self.witness = witness;
        self
    }
}

impl fmt::Display for TxOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.locking_script[..self.locking_script.len().min(30)];
        write!(f, "TxOut(value={}, script={})", self.value, hex::encode(shown))
    }
}

impl Encodable for TxOut {
    fn encode<B: BufMut>(&self, buf: &mut B, params: SerializeParams) -> Result<(), EncodeError> {
        self.value.encode(buf, params)?;
        write_bytes(buf, &self.locking_script);
        Ok(())
    }
}

impl Decodable for TxOut {
    fn decode(reader: &mut Reader<'_>, params: SerializeParams) -> Result<Self, DecodeError> {
        Ok(Self {
            value: ConfidentialValue::decode(reader, params)?,
            locking_script: reader.read_bytes()?,
            witness: OutputWitness::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Asset issuance
// ---------------------------------------------------------------------------

/// A new asset issued from an input's entropy.
///
/// Attached to at most one input of the transaction; the issued asset and
/// its capability tokens are paid to the transaction's own outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetIssuance {
    /// Extra entropy mixed into the asset tag. No consensus meaning; higher
    /// layers use it to bind a contract to the asset.
    pub entropy_nonce: Hash256,
    /// Amount issued, explicit or blinded.
    pub amount: ConfidentialValue,
    /// Number of reissuance (inflation) tokens to create. Zero for none.
    pub inflation_keys: Amount,
    /// Number of deissuance (deflation) tokens to create. Zero for none.
    pub deflation_keys: Amount,
}

/// More of an existing asset, authorized by spending a reissuance token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReissuance {
    /// Entropy the asset tag was originally derived from.
    pub asset_entropy: Hash256,
    /// Amount reissued, explicit or blinded.
    pub amount: ConfidentialValue,
    /// Blinding nonce of the spent token. Revealing it shows the input is
    /// the reissuance capability for this asset.
    pub blinding_nonce: Hash256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeLimits;
    use crate::crypto::double_sha256;
    use crate::encoding::{deserialize, serialize};

    #[test]
    fn test_null_outpoint() {
        let null = OutPoint::null();
        assert!(null.is_null());
        assert!(!OutPoint::new(Hash256::ZERO, 0).is_null());
        assert!(!OutPoint::new(double_sha256(b"tx"), u32::MAX).is_null());
    }

    #[test]
    fn test_outpoint_ordering_is_txid_then_index() {
        let low = double_sha256(b"a").min(double_sha256(b"b"));
        let high = double_sha256(b"a").max(double_sha256(b"b"));
        let mut points = vec![
            OutPoint::new(high, 0),
            OutPoint::new(low, 7),
            OutPoint::new(low, 2),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![OutPoint::new(low, 2), OutPoint::new(low, 7), OutPoint::new(high, 0)]
        );
    }

    #[test]
    fn test_outpoint_wire_layout() {
        let point = OutPoint::new(Hash256([0x11; 32]), 3);
        let bytes = serialize(&point, SerializeParams::native()).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[32..], &[3, 0, 0, 0]);
    }

    #[test]
    fn test_txin_wire_layout() {
        let input = TxIn::new(OutPoint::new(Hash256([0x22; 32]), 1))
            .with_script(vec![0x51])
            .with_sequence(0xFFFF_FFFE);
        let bytes = serialize(&input, SerializeParams::native()).unwrap();
        assert_eq!(bytes.len(), 36 + 2 + 4);
        assert_eq!(&bytes[36..], &[0x01, 0x51, 0xFE, 0xFF, 0xFF, 0xFF]);
        let back: TxIn =
            deserialize(&bytes, SerializeParams::native(), DecodeLimits::default()).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_relative_lock_time_bits() {
        let input = TxIn::new(OutPoint::null());
        assert_eq!(input.relative_lock_time(), None);

        let blocks = input.clone().with_sequence(144);
        assert_eq!(blocks.relative_lock_time(), Some(RelativeLockTime::Blocks(144)));

        let seconds = input
            .clone()
            .with_sequence(TxIn::SEQUENCE_LOCKTIME_TYPE_FLAG | 2);
        assert_eq!(seconds.relative_lock_time(), Some(RelativeLockTime::Seconds(1024)));

        // Bits outside the mask and flags are ignored.
        let noisy = input.with_sequence(0x0001_0005);
        assert_eq!(noisy.relative_lock_time(), Some(RelativeLockTime::Blocks(5)));
    }

    #[test]
    fn test_txout_excludes_witness_from_body() {
        let out = TxOut::explicit(1_000, vec![0x51]).with_witness(OutputWitness {
            range_proof: vec![0xAA; 10],
            nonce_commitment: vec![0xBB; 33],
        });
        let bytes = serialize(&out, SerializeParams::native()).unwrap();
        assert_eq!(bytes.len(), 9 + 2);
        let back: TxOut =
            deserialize(&bytes, SerializeParams::native(), DecodeLimits::default()).unwrap();
        assert_eq!(back.value, out.value);
        assert!(back.witness.is_null());
    }

    #[test]
    fn test_output_witness_absent_in_bitcoin_mode() {
        let witness = OutputWitness {
            range_proof: vec![1, 2, 3],
            nonce_commitment: vec![],
        };
        assert!(serialize(&witness, SerializeParams::bitcoin()).unwrap().is_empty());
        let native = serialize(&witness, SerializeParams::native()).unwrap();
        assert_eq!(native, vec![0x03, 1, 2, 3, 0x00]);
    }

    #[test]
    fn test_null_txout() {
        assert!(TxOut::null().is_null());
        assert!(!TxOut::explicit(0, vec![]).is_null());
        assert!(!TxOut::new(ConfidentialValue::Null, vec![0x6a]).is_null());
    }
}
