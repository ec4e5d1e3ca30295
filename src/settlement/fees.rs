//! Fee Model
//!
//! Fees are collected at trade time and carried on the contract as data.
//! Settlement passes them through (CPMM), adds fees taken on settlement
//! profit (DPM), or reports zero (cancellation). Nothing here re-derives a
//! trade-time fee.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Fee shares collected for the platform, the contract creator, and the
/// liquidity pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fees {
    #[serde(default)]
    pub creator_fee: f64,
    #[serde(default)]
    pub platform_fee: f64,
    #[serde(default)]
    pub liquidity_fee: f64,
}

impl Fees {
    /// The zero fee triple reported by cancellation settlements.
    pub const ZERO: Fees = Fees {
        creator_fee: 0.0,
        platform_fee: 0.0,
        liquidity_fee: 0.0,
    };

    pub fn new(creator_fee: f64, platform_fee: f64, liquidity_fee: f64) -> Self {
        Self {
            creator_fee,
            platform_fee,
            liquidity_fee,
        }
    }

    /// Sum of all three shares.
    pub fn total(&self) -> f64 {
        self.creator_fee + self.platform_fee + self.liquidity_fee
    }

    pub fn is_zero(&self) -> bool {
        self.creator_fee == 0.0 && self.platform_fee == 0.0 && self.liquidity_fee == 0.0
    }
}

impl Add for Fees {
    type Output = Fees;

    fn add(self, rhs: Fees) -> Fees {
        Fees {
            creator_fee: self.creator_fee + rhs.creator_fee,
            platform_fee: self.platform_fee + rhs.platform_fee,
            liquidity_fee: self.liquidity_fee + rhs.liquidity_fee,
        }
    }
}

impl AddAssign for Fees {
    fn add_assign(&mut self, rhs: Fees) {
        *self = *self + rhs;
    }
}

/// Rates charged on positive DPM profit when a legacy market settles.
///
/// Defaults to zero. Older markets settled with a 1% platform and 4%
/// creator cut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DpmFeeSchedule {
    #[serde(default)]
    pub platform_fee_rate: f64,
    #[serde(default)]
    pub creator_fee_rate: f64,
}

impl DpmFeeSchedule {
    pub fn new(platform_fee_rate: f64, creator_fee_rate: f64) -> Self {
        Self {
            platform_fee_rate,
            creator_fee_rate,
        }
    }

    /// Combined rate taken out of a winner's profit.
    pub fn total_rate(&self) -> f64 {
        self.platform_fee_rate + self.creator_fee_rate
    }

    /// Fees owed on `profit`. Losses are never charged.
    pub fn fees_on_profit(&self, profit: f64) -> Fees {
        let profit = profit.max(0.0);
        Fees {
            creator_fee: self.creator_fee_rate * profit,
            platform_fee: self.platform_fee_rate * profit,
            liquidity_fee: 0.0,
        }
    }
}
