//! Plain amounts and fee rates.
//!
//! Amounts are signed 64-bit integers in base units, the same width the
//! wire uses for fees and for Bitcoin-compatible output values. Negative
//! values are representable because the wire allows them; [`money_range`]
//! is the check that rejects them where they are meaningless.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{COIN, MAX_MONEY};

/// An amount in base units.
pub type Amount = i64;

/// Returns `true` if `amount` is between zero and [`MAX_MONEY`] inclusive.
pub fn money_range(amount: Amount) -> bool {
    (0..=MAX_MONEY).contains(&amount)
}

/// Formats an amount as whole coins with eight decimals, e.g. `1.50000000`.
pub fn format_money(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let coin = COIN.unsigned_abs();
    format!("{}{}.{:08}", sign, abs / coin, abs % coin)
}

// ---------------------------------------------------------------------------
// FeeRate
// ---------------------------------------------------------------------------

/// A fee rate in base units per 1000 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeeRate {
    per_kb: Amount,
}

impl FeeRate {
    pub const fn new(per_kb: Amount) -> Self {
        Self { per_kb }
    }

    /// Rate that would charge `fee` for `size` bytes.
    pub fn from_fee(fee: Amount, size: usize) -> Self {
        if size == 0 {
            return Self::default();
        }
        Self {
            per_kb: fee.saturating_mul(1000) / size as i64,
        }
    }

    pub fn per_kb(&self) -> Amount {
        self.per_kb
    }

    /// Fee for `size` bytes. A non-zero rate never rounds a non-empty
    /// transaction down to a zero fee.
    pub fn fee_for(&self, size: usize) -> Amount {
        let fee = self.per_kb.saturating_mul(size as i64) / 1000;
        if fee == 0 && size != 0 {
            return self.per_kb.signum();
        }
        fee
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/kB", format_money(self.per_kb))
    }
}
