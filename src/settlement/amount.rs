//! Fixed-point currency units.
//!
//! Payout arithmetic runs in `f64` mana, but anything that has to conserve a
//! total exactly (liquidity apportionment) runs in integer units.

/// Fixed-point amount with 8 decimal places.
pub type Amount = i128;

/// Conversion factor: 1 mana = 100_000_000 units.
pub const AMOUNT_SCALE: i128 = 100_000_000;

/// Convert f64 to fixed-point Amount.
#[inline]
pub fn to_amount(value: f64) -> Amount {
    (value * AMOUNT_SCALE as f64).round() as Amount
}

/// Convert fixed-point Amount to f64.
#[inline]
pub fn from_amount(amount: Amount) -> f64 {
    amount as f64 / AMOUNT_SCALE as f64
}

/// Sum a sequence of f64 values in fixed-point units.
pub fn sum_amounts<I: IntoIterator<Item = f64>>(values: I) -> Amount {
    values.into_iter().map(to_amount).sum()
}
