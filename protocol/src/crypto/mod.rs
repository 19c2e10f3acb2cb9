//! # Cryptographic Primitives
//!
//! Only hashing lives here. Commitments, range proofs and signatures are
//! opaque byte strings to this crate: the codec carries them, it never
//! checks them.

pub mod hash;

pub use hash::{double_sha256, double_sha256_multi, sha256, Hash256};
