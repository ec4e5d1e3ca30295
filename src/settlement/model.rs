//! Settlement data model.
//!
//! Snapshot types are immutable inputs: the engine never mutates a bet,
//! contract, or liquidity record. Field names serialize in camelCase so
//! exported platform snapshots deserialize as-is.

use crate::settlement::fees::Fees;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User identifier.
pub type UserId = String;

/// Answer (or outcome) identifier -> resolved weight.
///
/// Ordered so every traversal is deterministic.
pub type Resolutions = BTreeMap<String, f64>;

/// Outcome tag for a bet on a binary market.
pub const YES: &str = "YES";
/// Outcome tag for a bet against a binary market.
pub const NO: &str = "NO";
/// Probabilistic resolution tag.
pub const MKT: &str = "MKT";
/// Cancellation tag.
pub const CANCEL: &str = "CANCEL";

// =============================================================================
// BINARY OUTCOME
// =============================================================================

/// Side of a binary CPMM position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinaryOutcome {
    #[default]
    Yes,
    No,
}

impl BinaryOutcome {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            YES => Some(Self::Yes),
            NO => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => YES,
            Self::No => NO,
        }
    }

    /// Value of one share on this side when `winner` resolves.
    pub fn settlement_value(&self, winner: BinaryOutcome) -> f64 {
        if *self == winner {
            1.0
        } else {
            0.0
        }
    }

    /// Value of one share on this side at resolution probability `p` (of YES).
    pub fn weighted_value(&self, p: f64) -> f64 {
        match self {
            Self::Yes => p,
            Self::No => 1.0 - p,
        }
    }
}

impl std::fmt::Display for BinaryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BET
// =============================================================================

/// Sale details attached to a bet record that closed out an earlier bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSale {
    /// Amount the seller received.
    pub amount: f64,
    /// The bet that was sold.
    pub bet_id: String,
}

/// An immutable wager record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    pub user_id: UserId,
    pub contract_id: String,
    /// Answer the bet was placed on (multi-outcome CPMM only).
    #[serde(default)]
    pub answer_id: Option<String>,
    /// `YES`/`NO`, or a free-response answer id for DPM markets.
    pub outcome: String,
    /// Invested amount.
    pub amount: f64,
    pub shares: f64,
    /// Loan outstanding on this bet, frozen when the bet was placed or sold.
    #[serde(default)]
    pub loan_amount: f64,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub sale: Option<BetSale>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_time: DateTime<Utc>,
}

impl Bet {
    /// Still held: neither sold nor itself a sale record.
    pub fn is_open(&self) -> bool {
        !self.is_sold && self.sale.is_none()
    }

    pub fn binary_outcome(&self) -> Option<BinaryOutcome> {
        BinaryOutcome::from_tag(&self.outcome)
    }
}

// =============================================================================
// LIQUIDITY
// =============================================================================

/// Currency contributed to a CPMM pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityProvision {
    pub id: String,
    pub user_id: UserId,
    pub contract_id: String,
    pub amount: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_time: DateTime<Utc>,
}

// =============================================================================
// CONTRACT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeType {
    Binary,
    PseudoNumeric,
    FreeResponse,
    MultipleChoice,
    Numeric,
}

/// Paired CPMM reserves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpmmPool {
    #[serde(rename = "YES")]
    pub yes: f64,
    #[serde(rename = "NO")]
    pub no: f64,
}

impl CpmmPool {
    pub fn reserve(&self, outcome: BinaryOutcome) -> f64 {
        match outcome {
            BinaryOutcome::Yes => self.yes,
            BinaryOutcome::No => self.no,
        }
    }
}

/// Frozen state of a single-outcome CPMM market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpmmState {
    pub pool: CpmmPool,
    /// Pricing parameter of the weighted constant product.
    #[serde(default = "default_p")]
    pub p: f64,
    /// Subsidy added to the pool but not yet converted into reserves.
    #[serde(default)]
    pub subsidy_pool: f64,
}

fn default_p() -> f64 {
    0.5
}

impl CpmmState {
    /// Probability of YES implied by the frozen reserves.
    pub fn implied_probability(&self) -> f64 {
        let CpmmPool { yes, no } = self.pool;
        let denom = (1.0 - self.p) * yes + self.p * no;
        if denom <= 0.0 {
            return self.p;
        }
        self.p * no / denom
    }
}

/// One answer of a multi-outcome CPMM market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub pool_yes: f64,
    pub pool_no: f64,
}

/// Frozen state of a multi-outcome CPMM market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCpmmState {
    pub answers: Vec<Answer>,
}

impl MultiCpmmState {
    pub fn has_answer(&self, answer_id: &str) -> bool {
        self.answers.iter().any(|answer| answer.id == answer_id)
    }
}

/// Frozen state of a legacy dynamic-parimutuel market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpmState {
    /// Amount wagered per outcome.
    pub pool: BTreeMap<String, f64>,
    /// Shares issued per outcome.
    #[serde(default)]
    pub total_shares: BTreeMap<String, f64>,
}

impl DpmState {
    pub fn pool_total(&self) -> f64 {
        self.pool.values().sum()
    }

    /// Probability of `outcome` implied by the share totals (shares squared).
    pub fn implied_probability(&self, outcome: &str) -> f64 {
        let squares: f64 = self.total_shares.values().map(|s| s * s).sum();
        if squares <= 0.0 {
            return 0.0;
        }
        let shares = self.total_shares.get(outcome).copied().unwrap_or(0.0);
        shares * shares / squares
    }
}

/// Market mechanism with its mechanism-specific pool state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Mechanism {
    #[serde(rename = "cpmm-1")]
    Cpmm1(CpmmState),
    #[serde(rename = "cpmm-multi-1")]
    CpmmMulti1(MultiCpmmState),
    #[serde(rename = "dpm-2")]
    Dpm2(DpmState),
    /// Any mechanism this engine cannot settle.
    #[serde(other)]
    Unsupported,
}

impl Mechanism {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpmm1(_) => "cpmm-1",
            Self::CpmmMulti1(_) => "cpmm-multi-1",
            Self::Dpm2(_) => "dpm-2",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Resolved contract snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub creator_id: UserId,
    pub outcome_type: OutcomeType,
    /// Fees collected while the market traded.
    #[serde(default)]
    pub collected_fees: Fees,
    pub mechanism: Mechanism,
}

// =============================================================================
// PAYOUTS
// =============================================================================

/// A signed currency movement for one user. Negative means clawback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub user_id: UserId,
    pub payout: f64,
}

impl Payout {
    pub fn new(user_id: impl Into<UserId>, payout: f64) -> Self {
        Self {
            user_id: user_id.into(),
            payout,
        }
    }
}

/// Complete settlement report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutInfo {
    pub payouts: Vec<Payout>,
    pub creator_payout: f64,
    pub liquidity_payouts: Vec<Payout>,
    /// Fees collected by this settlement pass.
    pub collected_fees: Fees,
}

impl PayoutInfo {
    pub fn bettor_total(&self) -> f64 {
        self.payouts.iter().map(|p| p.payout).sum()
    }

    pub fn liquidity_total(&self) -> f64 {
        self.liquidity_payouts.iter().map(|p| p.payout).sum()
    }

    /// Everything this report pays out, creator included.
    pub fn total_paid(&self) -> f64 {
        self.bettor_total() + self.liquidity_total() + self.creator_payout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_outcome_values() {
        assert_eq!(BinaryOutcome::Yes.settlement_value(BinaryOutcome::Yes), 1.0);
        assert_eq!(BinaryOutcome::No.settlement_value(BinaryOutcome::Yes), 0.0);
        assert!((BinaryOutcome::No.weighted_value(0.3) - 0.7).abs() < 1e-12);
        assert_eq!(BinaryOutcome::from_tag("MKT"), None);
    }

    #[test]
    fn test_bet_open_state() {
        let mut bet: Bet = serde_json::from_str(
            r#"{"id":"b1","userId":"u1","contractId":"c1","outcome":"YES",
                "amount":10,"shares":20,"createdTime":1700000000000}"#,
        )
        .unwrap();
        assert!(bet.is_open());
        assert_eq!(bet.loan_amount, 0.0);

        bet.is_sold = true;
        assert!(!bet.is_open());

        bet.is_sold = false;
        bet.sale = Some(BetSale {
            amount: 5.0,
            bet_id: "b0".to_string(),
        });
        assert!(!bet.is_open());
    }

    #[test]
    fn test_mechanism_tags() {
        let contract: Contract = serde_json::from_str(
            r#"{"id":"c1","creatorId":"alice","outcomeType":"BINARY",
                "mechanism":{"type":"cpmm-1","pool":{"YES":100,"NO":50},"p":0.5}}"#,
        )
        .unwrap();
        match &contract.mechanism {
            Mechanism::Cpmm1(state) => {
                assert_eq!(state.pool.reserve(BinaryOutcome::No), 50.0);
                assert_eq!(state.subsidy_pool, 0.0);
            }
            other => panic!("unexpected mechanism {:?}", other),
        }
        assert!(contract.collected_fees.is_zero());

        let unknown: Mechanism = serde_json::from_str(r#"{"type":"cpmm-2"}"#).unwrap();
        assert_eq!(unknown, Mechanism::Unsupported);
    }

    #[test]
    fn test_implied_probability() {
        let state = CpmmState {
            pool: CpmmPool { yes: 100.0, no: 300.0 },
            p: 0.5,
            subsidy_pool: 0.0,
        };
        // p * NO / ((1-p) * YES + p * NO) = 150 / 200
        assert!((state.implied_probability() - 0.75).abs() < 1e-12);
    }
}
