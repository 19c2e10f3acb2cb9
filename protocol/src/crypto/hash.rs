//! # Hashing Utilities
//!
//! Transaction ids and witness hashes are double-SHA-256 digests of the
//! wire serialization, exactly as on the host chain. [`Hash256`] is the
//! fixed-size digest type shared by outpoints, issuance records and the
//! cached transaction id.
//!
//! ## Byte order
//!
//! A `Hash256` stores the digest in the order SHA-256 produced it, which is
//! also the order it appears on the wire. Display and serde use the
//! reversed order that block explorers print, so a txid copied from a log
//! line matches what every other tool shows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use confidential_ledger::crypto::sha256;
///
/// let hash = sha256(b"confidential");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
///
/// # Example
///
/// ```
/// use confidential_ledger::crypto::double_sha256;
///
/// let txid = double_sha256(b"raw transaction bytes");
/// assert_eq!(txid.as_bytes().len(), 32);
/// ```
pub fn double_sha256(data: &[u8]) -> Hash256 {
    Hash256(sha256(&sha256(data)))
}

/// Double-SHA-256 over several slices fed back to back, without first
/// concatenating them.
pub fn double_sha256_multi(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let first: [u8; 32] = hasher.finalize().into();
    Hash256(sha256(&first))
}

// ---------------------------------------------------------------------------
// Hash256
// ---------------------------------------------------------------------------

/// A 32-byte digest in wire byte order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero hash. Marks the null outpoint.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Wraps raw bytes in wire order.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the bytes in wire order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Hex string in display (reversed) order.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Parse a hex string in display (reversed) order.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
