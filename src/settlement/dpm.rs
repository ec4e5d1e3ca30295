//! DPM Settlement (legacy dynamic parimutuel)
//!
//! Winners split the whole pool in proportion to their stake on the winning
//! outcome. Callers pass only open bets: sold positions were settled at
//! sale time.
//!
//! The floor/fee interaction reproduces the frozen legacy schedule:
//! fees come only out of positive profit, and a standard-resolution winner
//! never receives less than their stake.

use crate::settlement::fees::{DpmFeeSchedule, Fees};
use crate::settlement::model::{Bet, DpmState, Payout, PayoutInfo, Resolutions};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Tolerance when comparing bet stakes against recorded pool amounts.
const POOL_EPSILON: f64 = 1e-6;

/// Single winning outcome (`YES`, `NO`, or a free-response answer id).
pub fn dpm_standard_payouts(
    outcome: &str,
    state: &DpmState,
    collected_fees: &Fees,
    open_bets: &[Bet],
    schedule: &DpmFeeSchedule,
) -> PayoutInfo {
    let winning_bets: Vec<&Bet> = open_bets.iter().filter(|b| b.outcome == outcome).collect();
    let pool_total = state.pool_total();
    let winning_stake: f64 = winning_bets.iter().map(|b| b.amount).sum();

    check_pool_consistency(state, outcome, winning_stake);
    debug!(
        outcome,
        pool_total,
        winning_stake,
        winners = winning_bets.len(),
        implied = state.implied_probability(outcome),
        "settling dpm market"
    );

    if winning_stake <= 0.0 {
        // Nothing staked on the winner: no one to distribute the pool to.
        return PayoutInfo {
            payouts: winning_bets
                .iter()
                .map(|b| Payout::new(b.user_id.clone(), b.amount.max(0.0)))
                .collect(),
            creator_payout: 0.0,
            liquidity_payouts: Vec::new(),
            collected_fees: *collected_fees,
        };
    }

    let mut total_profit = 0.0;
    let payouts = winning_bets
        .iter()
        .map(|bet| {
            let winnings = bet.amount / winning_stake * pool_total;
            let profit = (winnings - bet.amount).max(0.0);
            total_profit += profit;
            Payout::new(
                bet.user_id.clone(),
                bet.amount + (1.0 - schedule.total_rate()) * profit,
            )
        })
        .collect();

    let settlement_fees = schedule.fees_on_profit(total_profit);
    PayoutInfo {
        payouts,
        creator_payout: settlement_fees.creator_fee,
        liquidity_payouts: Vec::new(),
        collected_fees: *collected_fees + settlement_fees,
    }
}

/// Weighted (MKT) resolution across outcomes.
///
/// Weights are normalized by their sum, which the caller guarantees is
/// positive. A bet on a weighted outcome receives its stake's share of that
/// outcome's slice of the pool; unlike the standard case it can receive less
/// than it staked.
pub fn dpm_multi_payouts(
    resolutions: &Resolutions,
    state: &DpmState,
    collected_fees: &Fees,
    open_bets: &[Bet],
    schedule: &DpmFeeSchedule,
) -> PayoutInfo {
    let pool_total = state.pool_total();
    let weight_total: f64 = resolutions.values().sum();

    let weighted_bets: Vec<(&Bet, f64)> = open_bets
        .iter()
        .filter_map(|bet| {
            let weight = resolutions.get(&bet.outcome).copied().unwrap_or(0.0);
            (weight > 0.0).then_some((bet, weight))
        })
        .collect();

    let mut stake_by_outcome: BTreeMap<&str, f64> = BTreeMap::new();
    for (bet, _) in &weighted_bets {
        *stake_by_outcome.entry(bet.outcome.as_str()).or_insert(0.0) += bet.amount;
    }
    for (outcome, stake) in &stake_by_outcome {
        check_pool_consistency(state, outcome, *stake);
    }

    let mut total_profit = 0.0;
    let payouts = weighted_bets
        .iter()
        .map(|(bet, weight)| {
            let stake = stake_by_outcome[bet.outcome.as_str()];
            let winnings = if stake > 0.0 {
                bet.amount / stake * (weight / weight_total) * pool_total
            } else {
                0.0
            };
            let profit = winnings - bet.amount;
            total_profit += profit.max(0.0);
            let payout = winnings - schedule.total_rate() * profit.max(0.0);
            Payout::new(bet.user_id.clone(), payout)
        })
        .collect();

    let settlement_fees = schedule.fees_on_profit(total_profit);
    PayoutInfo {
        payouts,
        creator_payout: settlement_fees.creator_fee,
        liquidity_payouts: Vec::new(),
        collected_fees: *collected_fees + settlement_fees,
    }
}

/// Cancellation: every open bet gets its stake back.
pub fn dpm_cancel_payouts(open_bets: &[Bet]) -> PayoutInfo {
    PayoutInfo {
        payouts: open_bets
            .iter()
            .map(|bet| Payout::new(bet.user_id.clone(), bet.amount))
            .collect(),
        creator_payout: 0.0,
        liquidity_payouts: Vec::new(),
        collected_fees: Fees::ZERO,
    }
}

/// Open stakes on an outcome cannot exceed what the pool recorded for it.
fn check_pool_consistency(state: &DpmState, outcome: &str, open_stake: f64) {
    let recorded = state.pool.get(outcome).copied().unwrap_or(0.0);
    if open_stake > recorded + POOL_EPSILON {
        warn!(
            outcome,
            open_stake,
            recorded,
            "open dpm stake exceeds recorded pool; snapshot may be inconsistent"
        );
    }
}
