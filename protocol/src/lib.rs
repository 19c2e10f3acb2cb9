// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Confidential Ledger — Transaction Codec
//!
//! The transaction model and wire format of a confidential-asset sidechain.
//! Output values can be hidden behind Pedersen commitments, with range
//! proofs carried next to the script witnesses in an extended format that
//! old parsers read as a transaction with no inputs. The same model also
//! reads and writes a Bitcoin-compatible subformat, so the sidechain can
//! carry host-chain transactions verbatim.
//!
//! ## Architecture
//!
//! - **config** — Format constants, flag bits and decode limits.
//! - **crypto** — SHA-256 and the double-SHA256 transaction hashes.
//! - **encoding** — CompactSize, readers and writers, codec traits.
//! - **transaction** — Values, components, the codec and the frozen
//!   transaction, plus format checks and relay policy.
//! - **sigcache** — Shared cache of verified signatures.
//! - **logging** — `tracing` subscriber setup for binaries and tests.
//!
//! ## Ground Rules
//!
//! 1. Every transaction has exactly one encoding per format. Anything that
//!    would decode two ways is rejected.
//! 2. Length prefixes are checked against limits before any allocation.
//! 3. Commitments and proofs are carried, never interpreted.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod logging;
pub mod sigcache;
pub mod transaction;

pub use encoding::{deserialize, serialize, DecodeError, EncodeError, SerializeParams};
pub use sigcache::SignatureCache;
pub use transaction::{MutableTransaction, Transaction};
