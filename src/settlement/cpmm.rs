//! CPMM Settlement
//!
//! Constant-product shares redeem at par: a winning share pays 1, a losing
//! share pays 0, and a share at resolution probability `p` pays `p` (YES) or
//! `1 - p` (NO). Liquidity providers split the terminal pool value, valued
//! the same way, via [`apportion_liquidity`].

use crate::settlement::config::SettlementConfig;
use crate::settlement::error::PayoutResult;
use crate::settlement::fees::Fees;
use crate::settlement::liquidity::apportion_liquidity;
use crate::settlement::model::{
    BinaryOutcome, Bet, CpmmState, LiquidityProvision, MultiCpmmState, Payout, PayoutInfo,
    Resolutions,
};
use tracing::debug;

/// Refund every bettor and liquidity provider exactly what they put in.
pub fn fixed_cancel_payouts(bets: &[Bet], liquidities: &[LiquidityProvision]) -> PayoutInfo {
    let payouts = bets
        .iter()
        .map(|bet| Payout::new(bet.user_id.clone(), bet.amount))
        .collect();
    let liquidity_payouts = liquidities
        .iter()
        .map(|lp| Payout::new(lp.user_id.clone(), lp.amount))
        .collect();

    PayoutInfo {
        payouts,
        creator_payout: 0.0,
        liquidity_payouts,
        collected_fees: Fees::ZERO,
    }
}

/// YES/NO resolution: winning shares pay 1 each.
pub fn standard_fixed_payouts(
    winner: BinaryOutcome,
    state: &CpmmState,
    collected_fees: &Fees,
    bets: &[Bet],
    liquidities: &[LiquidityProvision],
    config: &SettlementConfig,
) -> PayoutResult<PayoutInfo> {
    let payouts = bets
        .iter()
        .filter_map(|bet| {
            let value = bet.binary_outcome()?.settlement_value(winner);
            (value > 0.0).then(|| Payout::new(bet.user_id.clone(), value * bet.shares))
        })
        .collect();

    let terminal = state.pool.reserve(winner) + state.subsidy_pool;

    Ok(PayoutInfo {
        payouts,
        creator_payout: collected_fees.creator_fee,
        liquidity_payouts: liquidity_pool_payouts(terminal, liquidities, config)?,
        collected_fees: *collected_fees,
    })
}

/// MKT resolution at probability `p` of YES.
///
/// Zero payouts are omitted, so `p = 1` and `p = 0` reproduce the YES and
/// NO settlements.
pub fn mkt_fixed_payouts(
    probability: f64,
    state: &CpmmState,
    collected_fees: &Fees,
    bets: &[Bet],
    liquidities: &[LiquidityProvision],
    config: &SettlementConfig,
) -> PayoutResult<PayoutInfo> {
    debug!(
        probability,
        implied = state.implied_probability(),
        "settling cpmm market at probability"
    );

    let payouts = bets
        .iter()
        .filter_map(|bet| {
            let value = bet.binary_outcome()?.weighted_value(probability);
            Some(Payout::new(bet.user_id.clone(), value * bet.shares))
        })
        .filter(|p| p.payout != 0.0)
        .collect();

    let terminal = probability * state.pool.yes
        + (1.0 - probability) * state.pool.no
        + state.subsidy_pool;

    Ok(PayoutInfo {
        payouts,
        creator_payout: collected_fees.creator_fee,
        liquidity_payouts: liquidity_pool_payouts(terminal, liquidities, config)?,
        collected_fees: *collected_fees,
    })
}

/// Multi-outcome resolution.
///
/// Each answer settles like a binary market at its resolved weight; listed
/// answers missing from `resolutions` weigh 0. The dispatcher has already
/// checked that every key and every bet names a listed answer. A single weight-1 answer is a definite
/// resolution, several fractional weights a partial one.
pub fn multi_fixed_payouts(
    state: &MultiCpmmState,
    collected_fees: &Fees,
    resolutions: &Resolutions,
    bets: &[Bet],
    liquidities: &[LiquidityProvision],
    config: &SettlementConfig,
) -> PayoutResult<PayoutInfo> {
    let payouts = bets
        .iter()
        .filter_map(|bet| {
            let weight = answer_weight(resolutions, bet.answer_id.as_deref());
            let value = bet.binary_outcome()?.weighted_value(weight);
            Some(Payout::new(bet.user_id.clone(), value * bet.shares))
        })
        .filter(|p| p.payout != 0.0)
        .collect();

    let terminal: f64 = state
        .answers
        .iter()
        .map(|answer| {
            let weight = answer_weight(resolutions, Some(answer.id.as_str()));
            weight * answer.pool_yes + (1.0 - weight) * answer.pool_no
        })
        .sum();

    Ok(PayoutInfo {
        payouts,
        creator_payout: 0.0,
        liquidity_payouts: liquidity_pool_payouts(terminal, liquidities, config)?,
        collected_fees: *collected_fees,
    })
}

fn answer_weight(resolutions: &Resolutions, answer_id: Option<&str>) -> f64 {
    answer_id
        .and_then(|id| resolutions.get(id))
        .copied()
        .unwrap_or(0.0)
}

fn liquidity_pool_payouts(
    terminal: f64,
    liquidities: &[LiquidityProvision],
    config: &SettlementConfig,
) -> PayoutResult<Vec<Payout>> {
    if terminal < config.dust_threshold {
        debug!(terminal, "terminal pool below dust threshold, no liquidity payouts");
        return Ok(Vec::new());
    }
    apportion_liquidity(liquidities, terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::test_support::{approx_eq, bet, cpmm_state, liquidity};

    #[test]
    fn test_standard_pays_winning_shares() {
        let state = cpmm_state(40.0, 160.0);
        let fees = Fees::new(3.0, 1.0, 0.0);
        let bets = vec![
            bet("b1", "alice", "YES", 10.0, 25.0),
            bet("b2", "bob", "NO", 10.0, 14.0),
        ];
        let lps = vec![liquidity("l1", "carol", 100.0, 1)];

        let info = standard_fixed_payouts(
            BinaryOutcome::Yes,
            &state,
            &fees,
            &bets,
            &lps,
            &SettlementConfig::default(),
        )
        .unwrap();

        assert_eq!(info.payouts, vec![Payout::new("alice", 25.0)]);
        assert_eq!(info.creator_payout, 3.0);
        assert_eq!(info.collected_fees, fees);
        assert_eq!(info.liquidity_payouts, vec![Payout::new("carol", 40.0)]);
    }

    #[test]
    fn test_subsidy_pool_goes_to_providers() {
        let mut state = cpmm_state(40.0, 160.0);
        state.subsidy_pool = 10.0;
        let lps = vec![liquidity("l1", "carol", 100.0, 1)];

        let info = standard_fixed_payouts(
            BinaryOutcome::No,
            &state,
            &Fees::ZERO,
            &[],
            &lps,
            &SettlementConfig::default(),
        )
        .unwrap();
        assert_eq!(info.liquidity_payouts, vec![Payout::new("carol", 170.0)]);
    }

    #[test]
    fn test_mkt_blends_shares() {
        let state = cpmm_state(100.0, 100.0);
        let bets = vec![
            bet("b1", "alice", "YES", 10.0, 20.0),
            bet("b2", "bob", "NO", 10.0, 10.0),
        ];

        let info = mkt_fixed_payouts(
            0.25,
            &state,
            &Fees::ZERO,
            &bets,
            &[],
            &SettlementConfig::default(),
        )
        .unwrap();

        assert_eq!(info.payouts.len(), 2);
        assert!(approx_eq(info.payouts[0].payout, 5.0));
        assert!(approx_eq(info.payouts[1].payout, 7.5));
        assert!(info.liquidity_payouts.is_empty());
    }

    #[test]
    fn test_dust_pool_not_distributed() {
        let state = cpmm_state(0.0001, 50.0);
        let lps = vec![liquidity("l1", "carol", 100.0, 1)];

        let info = standard_fixed_payouts(
            BinaryOutcome::Yes,
            &state,
            &Fees::ZERO,
            &[],
            &lps,
            &SettlementConfig::default(),
        )
        .unwrap();
        assert!(info.liquidity_payouts.is_empty());
    }

    #[test]
    fn test_cancel_refunds_amounts() {
        let bets = vec![
            bet("b1", "alice", "YES", 10.0, 25.0),
            bet("b2", "bob", "NO", 7.5, 14.0),
        ];
        let lps = vec![liquidity("l1", "carol", 100.0, 1)];

        let info = fixed_cancel_payouts(&bets, &lps);
        assert_eq!(
            info.payouts,
            vec![Payout::new("alice", 10.0), Payout::new("bob", 7.5)]
        );
        assert_eq!(info.liquidity_payouts, vec![Payout::new("carol", 100.0)]);
        assert_eq!(info.creator_payout, 0.0);
        assert!(info.collected_fees.is_zero());
    }
}
