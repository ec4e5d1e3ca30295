//! Loan Ledger
//!
//! Loans are frozen on each bet record (`Bet::loan_amount`). Sale records
//! carry the repaid portion as a negative loan, so summing a user's records
//! yields what is still outstanding. Settlement claws the outstanding balance
//! back as one negative payout per user.

use crate::settlement::model::{Bet, Payout, UserId};
use std::collections::BTreeMap;

/// Outstanding loan balance per user.
pub fn outstanding_loans(bets: &[Bet]) -> BTreeMap<UserId, f64> {
    let mut loans: BTreeMap<UserId, f64> = BTreeMap::new();
    for bet in bets.iter().filter(|b| b.loan_amount != 0.0) {
        *loans.entry(bet.user_id.clone()).or_insert(0.0) += bet.loan_amount;
    }
    loans
}

/// Clawback payouts for every user still carrying a loan.
///
/// Ordered by user id, so the result does not depend on bet order.
pub fn loan_payouts(bets: &[Bet]) -> Vec<Payout> {
    outstanding_loans(bets)
        .into_iter()
        .filter(|(_, loan)| *loan != 0.0)
        .map(|(user_id, loan)| Payout::new(user_id, -loan))
        .collect()
}

/// Loan repaid when `shares_sold` shares of a position are sold.
///
/// `position_bets` are one user's bets on one outcome. Repayment is pro-rata
/// to the fraction of open shares sold, capped at the full balance.
pub fn sale_loan_repayment(position_bets: &[Bet], shares_sold: f64) -> f64 {
    let open: Vec<&Bet> = position_bets.iter().filter(|b| b.is_open()).collect();
    let open_shares: f64 = open.iter().map(|b| b.shares).sum();
    if open_shares <= 0.0 || shares_sold <= 0.0 {
        return 0.0;
    }

    let loan: f64 = open.iter().map(|b| b.loan_amount).sum();
    let fraction_sold = (shares_sold / open_shares).min(1.0);
    loan * fraction_sold
}
