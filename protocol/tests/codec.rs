//! Wire-format integration tests.
//!
//! These drive the public API the way a node would: build transactions,
//! freeze them, push them through every serialization mode and read them
//! back from raw bytes. Byte strings for the rejection cases are assembled
//! by hand so the tests do not depend on the writer being correct.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use confidential_ledger::config::{DecodeLimits, FLAG_INPUT_WITNESS, FLAG_OUTPUT_WITNESS};
use confidential_ledger::crypto::{double_sha256, Hash256};
use confidential_ledger::encoding::{deserialize, serialize, DecodeError, SerializeParams};
use confidential_ledger::logging::{try_init_logging, LogFormat};
use confidential_ledger::transaction::{
    check_format, compute_flags, ConfidentialValue, InputWitness, MutableTransaction, OutPoint,
    OutputWitness, Transaction, TransactionError, TxIn, TxOut,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn init() {
    // Several tests race to install the subscriber; only the first wins.
    let _ = try_init_logging("debug", LogFormat::Pretty);
}

fn decode(bytes: &[u8], params: SerializeParams) -> Result<Transaction, DecodeError> {
    deserialize(bytes, params, DecodeLimits::default())
}

fn random_bytes(rng: &mut StdRng, max_len: usize) -> Vec<u8> {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen()).collect()
}

fn random_value(rng: &mut StdRng) -> ConfidentialValue {
    if rng.gen_bool(0.5) {
        ConfidentialValue::explicit(rng.gen_range(0..=21_000_000 * 100_000_000))
    } else {
        let mut raw = [0u8; 33];
        rng.fill(&mut raw[..]);
        raw[0] = if rng.gen_bool(0.5) { 0x08 } else { 0x09 };
        ConfidentialValue::committed(raw).unwrap_or_default()
    }
}

/// A random transaction. Input witnesses are set on a random subset of the
/// inputs, so the container may be sparse or shorter than the input list.
fn random_transaction(rng: &mut StdRng) -> MutableTransaction {
    let mut tx = MutableTransaction::new()
        .with_version(rng.gen_range(1..=2))
        .with_fee(rng.gen_range(0..1_000_000))
        .with_lock_time(rng.gen());

    let input_count = rng.gen_range(1..=4);
    for _ in 0..input_count {
        let mut txid = [0u8; 32];
        rng.fill(&mut txid);
        let input = TxIn::new(OutPoint::new(Hash256(txid), rng.gen_range(0..8)))
            .with_script(random_bytes(rng, 120))
            .with_sequence(rng.gen());
        tx = tx.with_input(input);
    }

    for _ in 0..rng.gen_range(1..=4) {
        let mut output = TxOut::new(random_value(rng), random_bytes(rng, 40));
        if output.value.is_commitment() && rng.gen_bool(0.7) {
            output = output.with_witness(OutputWitness {
                range_proof: random_bytes(rng, 600),
                nonce_commitment: random_bytes(rng, 33),
            });
        }
        tx = tx.with_output(output);
    }

    for index in 0..input_count {
        if rng.gen_bool(0.4) {
            let stack = (0..rng.gen_range(0..=3)).map(|_| random_bytes(rng, 80)).collect();
            tx.set_input_witness(index, InputWitness::new(stack));
        }
    }
    tx
}

fn single_spend() -> TxIn {
    TxIn::new(OutPoint::new(Hash256([0x42; 32]), 1))
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn random_transactions_round_trip_natively() -> Result<()> {
    init();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..200 {
        let tx = random_transaction(&mut rng).freeze()?;
        let bytes = tx.to_bytes(SerializeParams::native())?;
        let back = decode(&bytes, SerializeParams::native())?;

        assert_eq!(back.as_mutable(), tx.as_mutable());
        assert_eq!(back.id(), tx.id());
        assert_eq!(back.witness_hash(), tx.witness_hash());
        assert_eq!(back.total_size(), bytes.len());
    }
    Ok(())
}

#[test]
fn random_transactions_round_trip_without_witness() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let tx = random_transaction(&mut rng).freeze()?;
        let stripped = tx.to_bytes(SerializeParams::no_witness())?;
        let back = decode(&stripped, SerializeParams::no_witness())?;

        assert_eq!(back.id(), tx.id());
        assert_eq!(back.stripped_size(), tx.stripped_size());
        assert!(back.witness().is_null());
        assert!(back.outputs().iter().all(|out| out.witness.is_null()));
    }
    Ok(())
}

#[test]
fn bitcoin_compatible_round_trip_preserves_fee_and_amounts() -> Result<()> {
    let mut builder = MutableTransaction::new()
        .without_fee()
        .with_input(single_spend())
        .with_output(TxOut::explicit(50_000, vec![0x51]))
        .with_output(TxOut::explicit(1_234, vec![0x00, 0x14]))
        .with_lock_time(600_000);
    builder.set_input_witness(0, InputWitness::new(vec![vec![0x30; 70], vec![0x03; 33]]));
    let tx = builder.freeze()?;

    let legacy = tx.to_bytes(SerializeParams::bitcoin())?;
    let back = decode(&legacy, SerializeParams::bitcoin())?;
    assert_eq!(back.fee(), None);
    assert!(back.is_bitcoin_compatible());
    let amounts: Vec<_> = back.outputs().iter().map(|out| out.value.amount()).collect();
    assert_eq!(amounts, vec![Some(50_000), Some(1_234)]);
    assert_eq!(back.witness(), tx.witness());
    assert_eq!(back.to_bytes(SerializeParams::bitcoin())?, legacy);

    // Native re-encode: no fee field and bare amounts, so the bytes are the
    // host-chain bytes and read back in the Bitcoin-compatible subformat.
    let native = back.to_bytes(SerializeParams::native())?;
    assert_eq!(native, legacy);
    assert_eq!(&native[4..6], &[0x00, FLAG_INPUT_WITNESS]);
    let again = decode(&native, SerializeParams::bitcoin())?;
    assert_eq!(again.as_mutable(), back.as_mutable());
    assert_eq!(again.fee(), None);

    // The id is the host-chain txid: the hash of the witness-stripped bytes.
    let stripped = back.to_bytes(SerializeParams::bitcoin().without_witness())?;
    assert_eq!(back.id(), &double_sha256(&stripped));
    assert_eq!(again.id(), back.id());
    assert_eq!(back.to_bytes(SerializeParams::no_witness())?, stripped);
    assert_ne!(back.witness_hash(), back.id());
    Ok(())
}

#[test]
fn sparse_input_witnesses_round_trip() -> Result<()> {
    let mut builder = MutableTransaction::new()
        .with_fee(500)
        .with_input(single_spend())
        .with_input(TxIn::new(OutPoint::new(Hash256([0x43; 32]), 0)))
        .with_input(TxIn::new(OutPoint::new(Hash256([0x44; 32]), 2)))
        .with_output(TxOut::explicit(7_000, vec![0x51]));
    builder.set_input_witness(1, InputWitness::new(vec![vec![0x30; 71]]));
    let tx = builder.freeze()?;
    assert_eq!(tx.witness().len(), 2);

    let bytes = tx.to_bytes(SerializeParams::native())?;
    let back = decode(&bytes, SerializeParams::native())?;
    assert_eq!(back.witness().len(), 3);
    assert_eq!(back.witness(), tx.witness());
    assert_eq!(back.as_mutable(), tx.as_mutable());
    assert_eq!(back.witness_hash(), tx.witness_hash());
    Ok(())
}

// ---------------------------------------------------------------------------
// Hashes
// ---------------------------------------------------------------------------

#[test]
fn witness_changes_witness_hash_but_not_id() -> Result<()> {
    let base = MutableTransaction::new()
        .with_input(single_spend())
        .with_output(TxOut::explicit(10, vec![]));

    let mut first = base.clone();
    first.set_input_witness(0, InputWitness::new(vec![vec![0x01]]));
    let mut second = base;
    second.set_input_witness(0, InputWitness::new(vec![vec![0x02], vec![0x03]]));

    let first = first.freeze()?;
    let second = second.freeze()?;
    assert_eq!(first.id(), second.id());
    assert_ne!(first.witness_hash(), second.witness_hash());
    Ok(())
}

// ---------------------------------------------------------------------------
// Concrete layouts
// ---------------------------------------------------------------------------

#[test]
fn input_witness_with_explicit_and_null_outputs() -> Result<()> {
    init();
    let mut builder = MutableTransaction::new()
        .with_input(single_spend())
        .with_output(TxOut::explicit(7_500, vec![0x51]))
        .with_output(TxOut::null())
        .with_lock_time(0);
    builder.set_input_witness(0, InputWitness::new(vec![vec![0xAA; 72], vec![0xBB; 33]]));

    let flags = compute_flags(&builder, SerializeParams::native());
    assert_eq!(flags & FLAG_INPUT_WITNESS, FLAG_INPUT_WITNESS);
    assert_eq!(flags & FLAG_OUTPUT_WITNESS, 0);

    let tx = builder.freeze()?;
    let bytes = tx.to_bytes(SerializeParams::native())?;
    // version(4) + fee(8), then the marker and flags.
    assert_eq!(&bytes[12..14], &[0x00, FLAG_INPUT_WITNESS]);

    let back = decode(&bytes, SerializeParams::native())?;
    assert_eq!(compute_flags(back.as_mutable(), SerializeParams::native()), flags);
    assert_eq!(back.outputs()[0].value, ConfidentialValue::Explicit(7_500));
    assert!(back.outputs()[1].is_null());
    assert_eq!(back.witness().get(0).map(|w| w.stack.len()), Some(2));
    assert_eq!(back.lock_time(), 0);
    Ok(())
}

#[test]
fn empty_transaction_is_not_mistaken_for_extended_marker() -> Result<()> {
    let tx = MutableTransaction::new().freeze()?;
    let bytes = tx.to_bytes(SerializeParams::native())?;
    // version, fee, no inputs, no outputs, lock_time.
    assert_eq!(bytes.len(), 4 + 8 + 1 + 1 + 4);

    let back = decode(&bytes, SerializeParams::native())?;
    assert!(back.is_null());
    assert!(back.witness().is_null());
    assert_eq!(back, tx);
    Ok(())
}

#[test]
fn zero_input_transaction_decodes_without_witness_mode() -> Result<()> {
    let tx = MutableTransaction::new()
        .with_output(TxOut::explicit(3, vec![0x51]))
        .freeze()?;
    let bytes = tx.to_bytes(SerializeParams::no_witness())?;
    let back = decode(&bytes, SerializeParams::no_witness())?;
    assert!(back.inputs().is_empty());
    assert_eq!(back.outputs(), tx.outputs());
    assert_eq!(check_format(&back), Err(TransactionError::NoInputs));
    Ok(())
}

/// Known edge case: with witnesses allowed, a zero-input transaction that
/// has outputs reads its output count as the extended-format flags byte.
/// Such transactions are refused by `check_format`, never by the codec.
#[test]
fn zero_input_transaction_with_outputs_is_ambiguous_in_witness_mode() -> Result<()> {
    let tx = MutableTransaction::new()
        .with_output(TxOut::explicit(3, vec![0x51]))
        .freeze()?;
    let bytes = tx.to_bytes(SerializeParams::native())?;
    assert!(decode(&bytes, SerializeParams::native()).is_err());
    Ok(())
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

fn extended_prefix(flags: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&0i64.to_le_bytes());
    bytes.extend_from_slice(&[0x00, flags]);
    // One input.
    bytes.push(0x01);
    bytes.extend_from_slice(&[0x42; 32]);
    bytes.extend_from_slice(&[1, 0, 0, 0]);
    bytes.push(0x00);
    bytes.extend_from_slice(&[0xFF; 4]);
    // One explicit output, empty script.
    bytes.push(0x01);
    bytes.extend_from_slice(&[0x01, 0, 0, 0, 0, 0, 0, 0, 9, 0x00]);
    bytes
}

#[test]
fn input_witness_flag_with_empty_witness_is_rejected() {
    let mut bytes = extended_prefix(FLAG_INPUT_WITNESS);
    bytes.push(0x00);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(
        decode(&bytes, SerializeParams::native()),
        Err(DecodeError::SuperfluousWitness)
    );
}

#[test]
fn matching_witness_record_is_accepted() -> Result<()> {
    let mut bytes = extended_prefix(FLAG_INPUT_WITNESS);
    bytes.extend_from_slice(&[0x01, 0x01, 0xEE]);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    let tx = decode(&bytes, SerializeParams::native())?;
    assert_eq!(tx.to_bytes(SerializeParams::native())?, bytes);
    Ok(())
}

#[test]
fn unknown_flag_bits_are_rejected() {
    let mut bytes = extended_prefix(0x80 | FLAG_INPUT_WITNESS);
    bytes.extend_from_slice(&[0x01, 0x01, 0xEE]);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(
        decode(&bytes, SerializeParams::native()),
        Err(DecodeError::UnknownOptionalData(0x80))
    );
}

#[test]
fn trailing_bytes_are_rejected() -> Result<()> {
    let tx = MutableTransaction::new()
        .with_input(single_spend())
        .with_output(TxOut::explicit(1, vec![]))
        .freeze()?;
    let mut bytes = tx.to_bytes(SerializeParams::native())?;
    bytes.push(0x00);
    assert_eq!(
        decode(&bytes, SerializeParams::native()),
        Err(DecodeError::TrailingBytes(1))
    );
    Ok(())
}

#[test]
fn hostile_length_prefixes_fail_before_allocating() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&0i64.to_le_bytes());
    // 0xFE prefix claiming 0x01000000 inputs.
    bytes.extend_from_slice(&[0xFE, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(
        decode(&bytes, SerializeParams::native()),
        Err(DecodeError::OversizedVector {
            len: 0x0100_0000,
            max: DecodeLimits::default().max_vector_len
        })
    );
}

#[test]
fn oversized_transactions_are_rejected_up_front() -> Result<()> {
    let tx = MutableTransaction::new()
        .with_input(single_spend().with_script(vec![0x51; 500]))
        .with_output(TxOut::explicit(1, vec![]))
        .freeze()?;
    let bytes = tx.to_bytes(SerializeParams::native())?;
    let limits = DecodeLimits {
        max_transaction_size: 100,
        ..DecodeLimits::default()
    };
    let result: Result<Transaction, _> = deserialize(&bytes, SerializeParams::native(), limits);
    assert_eq!(
        result,
        Err(DecodeError::OversizedTransaction {
            size: bytes.len(),
            max: 100
        })
    );
    Ok(())
}

#[test]
fn limits_load_from_partial_json() -> Result<()> {
    let limits: DecodeLimits = serde_json::from_str(r#"{ "max_buffer_len": 520 }"#)?;
    assert_eq!(limits.max_buffer_len, 520);
    assert_eq!(limits.max_vector_len, DecodeLimits::default().max_vector_len);
    Ok(())
}

#[test]
fn hex_round_trip_through_public_api() -> Result<()> {
    let tx = MutableTransaction::new()
        .with_fee(1_000)
        .with_input(single_spend())
        .with_output(TxOut::explicit(99_000, vec![0x51]))
        .freeze()?;
    let hex = tx.to_hex()?;
    assert_eq!(Transaction::from_hex(&hex)?, tx);
    assert!(matches!(
        Transaction::from_hex("zz"),
        Err(DecodeError::InvalidHex(_))
    ));
    let _ = serialize(&tx, SerializeParams::native())?;
    Ok(())
}
