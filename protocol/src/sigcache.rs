//! Cache of already-verified signatures.
//!
//! Script verification runs once when a transaction enters the pool and
//! again when it shows up in a block. Entries record that a particular
//! input of a particular transaction, spending a particular amount under a
//! particular script, verified successfully, so the second pass can skip
//! the expensive check.
//!
//! Keys are double-SHA256 digests, which are uniformly distributed. When
//! the cache is full, inserting evicts the entry that follows the new key
//! in key order, which amounts to evicting a random entry.
//!
//! The cache is shared between validation threads: lookups take a read
//! lock, inserts a write lock.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use tracing::trace;

use crate::config::{DEFAULT_MAX_SIG_CACHE_SIZE, SIG_CACHE_ENTRY_BYTES};
use crate::crypto::{double_sha256_multi, Hash256};
use crate::transaction::ConfidentialValue;

/// A bounded set of verified (transaction, input) pairs.
#[derive(Debug)]
pub struct SignatureCache {
    entries: RwLock<BTreeSet<Hash256>>,
    max_entries: usize,
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::with_megabytes(DEFAULT_MAX_SIG_CACHE_SIZE)
    }
}

impl SignatureCache {
    /// A cache holding at most `max_entries` entries. Zero disables it.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeSet::new()),
            max_entries,
        }
    }

    /// A cache sized to roughly `megabytes` MiB of memory.
    pub fn with_megabytes(megabytes: usize) -> Self {
        Self::new(megabytes.saturating_mul(1 << 20) / SIG_CACHE_ENTRY_BYTES)
    }

    /// Key for a script check of input `input_index` of `txid`, spending
    /// outputs worth `amounts` and locked by `script`.
    ///
    /// Amounts are hashed in their native encoding, so an explicit amount
    /// and a commitment never collide.
    pub fn entry_key(
        txid: &Hash256,
        input_index: u32,
        amounts: &[ConfidentialValue],
        script: &[u8],
    ) -> Hash256 {
        let index = input_index.to_le_bytes();
        let encoded: Vec<Vec<u8>> = amounts.iter().map(ConfidentialValue::to_native_bytes).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(encoded.len() + 3);
        parts.push(txid.as_bytes());
        parts.push(&index);
        parts.extend(encoded.iter().map(Vec::as_slice));
        parts.push(script);
        double_sha256_multi(&parts)
    }

    /// Key for a verified range proof over `commitment`.
    pub fn range_proof_key(proof: &[u8], commitment: &[u8]) -> Hash256 {
        double_sha256_multi(&[commitment, proof])
    }

    pub fn contains(&self, key: &Hash256) -> bool {
        self.entries.read().contains(key)
    }

    /// Records `key` as verified, evicting one entry if the cache is full.
    pub fn insert(&self, key: Hash256) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.contains(&key) {
            return;
        }
        while entries.len() >= self.max_entries {
            let victim = entries
                .range(key..)
                .next()
                .or_else(|| entries.iter().next())
                .copied();
            match victim {
                Some(victim) => {
                    entries.remove(&victim);
                    trace!(%victim, "evicted signature cache entry");
                }
                None => break,
            }
        }
        entries.insert(key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
