//! Serializable settlement request.
//!
//! A snapshot is everything the engine needs for one contract, taken after
//! trading froze. The `settle` binary reads these as JSON.

use crate::settlement::aggregate::{settle_by_user, UserSettlement};
use crate::settlement::dispatch::PayoutEngine;
use crate::settlement::error::PayoutResult;
use crate::settlement::model::{Bet, Contract, LiquidityProvision, PayoutInfo, Resolutions, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSnapshot {
    /// `YES`, `NO`, `MKT`, `CANCEL`, an answer id, or absent.
    #[serde(default)]
    pub outcome: Option<String>,
    pub contract: Contract,
    #[serde(default)]
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub liquidities: Vec<LiquidityProvision>,
    #[serde(default)]
    pub resolutions: Option<Resolutions>,
    #[serde(default)]
    pub resolution_probability: Option<f64>,
}

/// Settlement report for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub contract_id: String,
    pub payout_info: PayoutInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_user: Option<BTreeMap<UserId, UserSettlement>>,
}

impl SettlementSnapshot {
    pub fn settle(&self, engine: &PayoutEngine) -> PayoutResult<PayoutInfo> {
        engine.compute_payouts(
            self.outcome.as_deref(),
            &self.contract,
            &self.bets,
            &self.liquidities,
            self.resolutions.as_ref(),
            self.resolution_probability,
        )
    }

    /// Settle and optionally attach the per-user breakdown.
    pub fn report(&self, engine: &PayoutEngine, by_user: bool) -> PayoutResult<SettlementReport> {
        let payout_info = self.settle(engine)?;
        let by_user = by_user.then(|| settle_by_user(&payout_info, &self.contract.creator_id, &self.bets));
        Ok(SettlementReport {
            contract_id: self.contract.id.clone(),
            payout_info,
            by_user,
        })
    }
}
