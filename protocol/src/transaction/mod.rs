//! # Transaction Module
//!
//! The confidential transaction model and its wire codec. Output values
//! may be explicit amounts or 33-byte Pedersen commitments; range proofs
//! and nonce commitments travel in a per-output witness next to the
//! per-input script witness. The same bytes can also be read and written
//! in a Bitcoin-compatible subformat with no fee field, no output witnesses
//! and bare 8-byte amounts.
//!
//! ## Architecture
//!
//! ```text
//! amount.rs       — Amount, money range, FeeRate
//! value.rs        — ConfidentialValue (explicit, committed, null, opaque)
//! types.rs        — OutPoint, TxIn, TxOut, OutputWitness, issuance records
//! witness.rs      — InputWitness and the sparse TransactionWitness
//! codec.rs        — Transaction-level read/write, flags byte, fee field
//! builder.rs      — MutableTransaction and the frozen Transaction
//! verification.rs — Structural format checks
//! policy.rs       — Weight, priority, dust
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** a [`MutableTransaction`] with the `with_*` helpers.
//! 2. **Freeze** it into a [`Transaction`], which caches its id and
//!    witness hash.
//! 3. **Check** it with [`check_format`] before relaying.
//! 4. **Thaw** it to change anything; the hashes are recomputed on the
//!    next freeze.

pub mod amount;
pub mod builder;
pub mod codec;
pub mod policy;
pub mod types;
pub mod value;
pub mod verification;
pub mod witness;

pub use amount::{format_money, money_range, Amount, FeeRate};
pub use builder::{MutableTransaction, Transaction};
pub use codec::compute_flags;
pub use types::{
    AssetIssuance, AssetReissuance, OutPoint, OutputWitness, RelativeLockTime, TxIn, TxOut,
};
pub use value::ConfidentialValue;
pub use verification::{check_format, TransactionError};
pub use witness::{InputWitness, TransactionWitness};
