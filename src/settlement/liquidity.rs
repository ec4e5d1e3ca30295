//! Liquidity pool apportionment.
//!
//! Splits a terminal pool value among liquidity providers in proportion to
//! the amount each contributed. Runs in fixed-point units so the payouts sum
//! to the terminal value exactly:
//!
//! 1. Stable sort contributions by `created_time` (input order breaks ties).
//! 2. Each contribution receives `floor(terminal * amount / total)` units.
//! 3. Residual units go to the earliest contribution.
//! 4. Contributions merge per user, in order of first contribution.
//!
//! Step 2 multiplies terminal units by contribution units in `i128`. A
//! product that does not fit (roughly terminal x contribution above 1.7e22
//! mana squared) fails the settlement instead of wrapping.

use crate::settlement::amount::{from_amount, to_amount, Amount};
use crate::settlement::error::{PayoutError, PayoutResult};
use crate::settlement::model::{LiquidityProvision, Payout, UserId};

/// Apportion `terminal_value` among `liquidities` by contributed amount.
///
/// Returns no payouts when nothing was contributed or the terminal value is
/// not positive.
pub fn apportion_liquidity(
    liquidities: &[LiquidityProvision],
    terminal_value: f64,
) -> PayoutResult<Vec<Payout>> {
    let terminal = to_amount(terminal_value);
    if terminal <= 0 {
        return Ok(Vec::new());
    }

    let mut ordered: Vec<(&LiquidityProvision, Amount)> = liquidities
        .iter()
        .map(|lp| (lp, to_amount(lp.amount)))
        .filter(|(_, units)| *units > 0)
        .collect();
    // sort_by_key is stable
    ordered.sort_by_key(|(lp, _)| lp.created_time);

    let total: Amount = ordered.iter().map(|(_, units)| *units).sum();
    if total <= 0 {
        return Ok(Vec::new());
    }

    let mut shares: Vec<Amount> = ordered
        .iter()
        .map(|(lp, units)| {
            terminal
                .checked_mul(*units)
                .map(|product| product / total)
                .ok_or_else(|| {
                    PayoutError::invalid_input(format!(
                        "liquidity {} too large to apportion: {} x {}",
                        lp.id, terminal_value, lp.amount
                    ))
                })
        })
        .collect::<PayoutResult<_>>()?;
    let allocated: Amount = shares.iter().sum();
    if let Some(earliest) = shares.first_mut() {
        *earliest += terminal - allocated;
    }

    let mut by_user: Vec<(UserId, Amount)> = Vec::new();
    for ((lp, _), share) in ordered.iter().zip(shares) {
        match by_user.iter_mut().find(|(user_id, _)| *user_id == lp.user_id) {
            Some((_, total_share)) => *total_share += share,
            None => by_user.push((lp.user_id.clone(), share)),
        }
    }

    Ok(by_user
        .into_iter()
        .map(|(user_id, units)| Payout::new(user_id, from_amount(units)))
        .collect())
}
