//! Payout Aggregation
//!
//! Merges per-bet payouts into per-user totals for ledger posting. Payouts
//! to the same user are summed, never replaced.

use crate::settlement::loans::loan_payouts;
use crate::settlement::model::{Bet, Payout, PayoutInfo, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sum payouts per user.
pub fn group_payouts_by_user(payouts: &[Payout]) -> BTreeMap<UserId, f64> {
    let mut totals: BTreeMap<UserId, f64> = BTreeMap::new();
    for payout in payouts {
        *totals.entry(payout.user_id.clone()).or_insert(0.0) += payout.payout;
    }
    totals
}

/// One user's share of a settlement, by source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettlement {
    pub bettor: f64,
    pub liquidity: f64,
    pub creator: f64,
    /// Loan clawback; zero or negative.
    pub loan: f64,
}

impl UserSettlement {
    /// Net balance change to post.
    pub fn net(&self) -> f64 {
        self.bettor + self.liquidity + self.creator + self.loan
    }
}

/// Break a settlement report down per user, including loan clawbacks.
///
/// `bets` is the full bet history (sold bets included) so loan balances net
/// out sale repayments.
pub fn settle_by_user(
    info: &PayoutInfo,
    creator_id: &str,
    bets: &[Bet],
) -> BTreeMap<UserId, UserSettlement> {
    let mut by_user: BTreeMap<UserId, UserSettlement> = BTreeMap::new();

    for (user_id, total) in group_payouts_by_user(&info.payouts) {
        by_user.entry(user_id).or_default().bettor = total;
    }
    for (user_id, total) in group_payouts_by_user(&info.liquidity_payouts) {
        by_user.entry(user_id).or_default().liquidity = total;
    }
    if info.creator_payout != 0.0 {
        by_user.entry(creator_id.to_string()).or_default().creator = info.creator_payout;
    }
    for payout in loan_payouts(bets) {
        by_user.entry(payout.user_id).or_default().loan = payout.payout;
    }

    by_user
}

/// Net balance change per user, loans included.
pub fn net_payouts_by_user(info: &PayoutInfo, creator_id: &str, bets: &[Bet]) -> BTreeMap<UserId, f64> {
    settle_by_user(info, creator_id, bets)
        .into_iter()
        .map(|(user_id, settlement)| (user_id, settlement.net()))
        .collect()
}
