//! Payout Dispatcher
//!
//! Routing is split in two steps:
//!
//! 1. [`SettlementPlan::resolve`] turns the loosely-typed request (outcome tag,
//!    optional resolutions, optional probability) into a closed
//!    mechanism x outcome-kind variant. Variants that need resolution data
//!    carry it as a field, so a plan can never be missing it.
//! 2. [`PayoutEngine::settle`] matches on the plan and runs the settlement.
//!
//! All validation happens before any payout is computed: a request either
//! yields a complete report or an error, never a partial report.

use crate::settlement::config::SettlementConfig;
use crate::settlement::cpmm::{
    fixed_cancel_payouts, mkt_fixed_payouts, multi_fixed_payouts, standard_fixed_payouts,
};
use crate::settlement::dpm::{dpm_cancel_payouts, dpm_multi_payouts, dpm_standard_payouts};
use crate::settlement::error::{PayoutError, PayoutResult};
use crate::settlement::model::{
    BinaryOutcome, Bet, Contract, CpmmState, DpmState, LiquidityProvision, Mechanism,
    MultiCpmmState, PayoutInfo, Resolutions, CANCEL, MKT,
};
use tracing::{debug, warn};

/// Tolerance for multi-outcome weights summing to 1.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// =============================================================================
// SETTLEMENT PLAN
// =============================================================================

/// A fully-validated settlement strategy for one contract.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementPlan<'a> {
    /// cpmm-1 resolved YES or NO.
    FixedStandard {
        state: &'a CpmmState,
        winner: BinaryOutcome,
    },
    /// cpmm-1 resolved MKT at a probability of YES.
    FixedMkt { state: &'a CpmmState, probability: f64 },
    /// Any CPMM cancellation.
    FixedCancel,
    /// cpmm-multi-1, definite or weighted.
    FixedMulti {
        state: &'a MultiCpmmState,
        resolutions: &'a Resolutions,
    },
    /// dpm-2 resolved to a single outcome or answer.
    DpmStandard { state: &'a DpmState, outcome: &'a str },
    /// dpm-2 resolved MKT across weighted outcomes.
    DpmMulti {
        state: &'a DpmState,
        resolutions: &'a Resolutions,
    },
    /// dpm-2 cancelled or resolved without an outcome.
    DpmCancel,
}

impl<'a> SettlementPlan<'a> {
    /// Select the settlement for `contract` resolved to `outcome`.
    pub fn resolve(
        outcome: Option<&'a str>,
        contract: &'a Contract,
        resolutions: Option<&'a Resolutions>,
        resolution_probability: Option<f64>,
    ) -> PayoutResult<Self> {
        match &contract.mechanism {
            Mechanism::Cpmm1(state) => match outcome {
                Some(MKT) => {
                    let probability = resolution_probability.ok_or_else(|| {
                        PayoutError::invalid_input("resolution probability required for MKT on cpmm-1")
                    })?;
                    validate_probability(probability)?;
                    Ok(Self::FixedMkt { state, probability })
                }
                Some(tag) => Ok(match BinaryOutcome::from_tag(tag) {
                    Some(winner) => Self::FixedStandard { state, winner },
                    None => Self::FixedCancel,
                }),
                None => Ok(Self::FixedCancel),
            },
            Mechanism::CpmmMulti1(state) => {
                if outcome == Some(CANCEL) {
                    return Ok(Self::FixedCancel);
                }
                let resolutions = resolutions.ok_or_else(|| {
                    PayoutError::invalid_input("resolutions required for cpmm-multi-1")
                })?;
                validate_weights(resolutions)?;
                validate_answer_weights(state, resolutions)?;
                Ok(Self::FixedMulti { state, resolutions })
            }
            Mechanism::Dpm2(state) => match outcome {
                None | Some(CANCEL) => Ok(Self::DpmCancel),
                Some(MKT) => {
                    let resolutions = resolutions.ok_or_else(|| {
                        PayoutError::invalid_input("resolutions required for MKT on dpm-2")
                    })?;
                    validate_weights(resolutions)?;
                    let total: f64 = resolutions.values().sum();
                    if total <= 0.0 {
                        return Err(PayoutError::invalid_input(
                            "resolution weights must have a positive sum",
                        ));
                    }
                    Ok(Self::DpmMulti { state, resolutions })
                }
                // YES, NO, or a free-response answer id
                Some(outcome) => Ok(Self::DpmStandard { state, outcome }),
            },
            Mechanism::Unsupported => Err(PayoutError::UnsupportedMechanism {
                mechanism: contract.mechanism.name().to_string(),
                outcome: outcome.map(str::to_string),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FixedStandard { .. } => "fixed_standard",
            Self::FixedMkt { .. } => "fixed_mkt",
            Self::FixedCancel => "fixed_cancel",
            Self::FixedMulti { .. } => "fixed_multi",
            Self::DpmStandard { .. } => "dpm_standard",
            Self::DpmMulti { .. } => "dpm_multi",
            Self::DpmCancel => "dpm_cancel",
        }
    }

    /// DPM settles only positions still held; sold bets were paid at sale.
    pub fn settles_open_bets_only(&self) -> bool {
        matches!(
            self,
            Self::DpmStandard { .. } | Self::DpmMulti { .. } | Self::DpmCancel
        )
    }
}

fn validate_probability(probability: f64) -> PayoutResult<()> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(PayoutError::invalid_input(format!(
            "resolution probability must lie in [0, 1], got {}",
            probability
        )));
    }
    Ok(())
}

fn validate_weights(resolutions: &Resolutions) -> PayoutResult<()> {
    for (answer_id, weight) in resolutions {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(PayoutError::invalid_input(format!(
                "resolution weight for {} must be a non-negative number, got {}",
                answer_id, weight
            )));
        }
    }
    Ok(())
}

/// Multi-outcome weights are per-answer probabilities keyed by listed answers.
fn validate_answer_weights(state: &MultiCpmmState, resolutions: &Resolutions) -> PayoutResult<()> {
    for (answer_id, weight) in resolutions {
        if *weight > 1.0 {
            return Err(PayoutError::invalid_input(format!(
                "resolution weight for {} must not exceed 1, got {}",
                answer_id, weight
            )));
        }
        if !state.has_answer(answer_id) {
            return Err(PayoutError::invalid_input(format!(
                "resolutions name unknown answer {}",
                answer_id
            )));
        }
    }
    Ok(())
}

/// Every multi-outcome bet must name one of the contract's answers.
fn validate_answer_bets(state: &MultiCpmmState, bets: &[Bet]) -> PayoutResult<()> {
    for bet in bets {
        match bet.answer_id.as_deref() {
            Some(answer_id) if state.has_answer(answer_id) => {}
            Some(answer_id) => {
                return Err(PayoutError::invalid_input(format!(
                    "bet {} is on unknown answer {}",
                    bet.id, answer_id
                )))
            }
            None => {
                return Err(PayoutError::invalid_input(format!(
                    "bet {} has no answer id",
                    bet.id
                )))
            }
        }
    }
    Ok(())
}

/// Every bet and liquidity record must belong to the contract being settled.
fn validate_snapshot(
    contract: &Contract,
    bets: &[Bet],
    liquidities: &[LiquidityProvision],
) -> PayoutResult<()> {
    for bet in bets {
        if bet.contract_id != contract.id {
            return Err(PayoutError::invalid_input(format!(
                "bet {} belongs to contract {}, not {}",
                bet.id, bet.contract_id, contract.id
            )));
        }
        if !bet.amount.is_finite() || !bet.shares.is_finite() || !bet.loan_amount.is_finite() {
            return Err(PayoutError::invalid_input(format!(
                "bet {} has a non-finite amount",
                bet.id
            )));
        }
    }
    for lp in liquidities {
        if lp.contract_id != contract.id {
            return Err(PayoutError::invalid_input(format!(
                "liquidity {} belongs to contract {}, not {}",
                lp.id, lp.contract_id, contract.id
            )));
        }
        if !lp.amount.is_finite() {
            return Err(PayoutError::invalid_input(format!(
                "liquidity {} has a non-finite amount",
                lp.id
            )));
        }
    }
    Ok(())
}

// =============================================================================
// PAYOUT ENGINE
// =============================================================================

/// Pure settlement engine: the same inputs always produce the same report.
#[derive(Debug, Clone, Default)]
pub struct PayoutEngine {
    config: SettlementConfig,
}

impl PayoutEngine {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    /// Compute every payout for a resolved contract.
    pub fn compute_payouts(
        &self,
        outcome: Option<&str>,
        contract: &Contract,
        bets: &[Bet],
        liquidities: &[LiquidityProvision],
        resolutions: Option<&Resolutions>,
        resolution_probability: Option<f64>,
    ) -> PayoutResult<PayoutInfo> {
        validate_snapshot(contract, bets, liquidities)?;
        let plan = SettlementPlan::resolve(outcome, contract, resolutions, resolution_probability)?;
        if let SettlementPlan::FixedMulti { state, .. } = &plan {
            validate_answer_bets(state, bets)?;
        }

        debug!(
            contract_id = %contract.id,
            mechanism = contract.mechanism.name(),
            outcome_type = ?contract.outcome_type,
            outcome = outcome.unwrap_or("<none>"),
            plan = plan.name(),
            bets = bets.len(),
            liquidities = liquidities.len(),
            "computing payouts"
        );

        self.settle(&plan, contract, bets, liquidities)
    }

    /// Run an already-resolved plan.
    pub fn settle(
        &self,
        plan: &SettlementPlan<'_>,
        contract: &Contract,
        bets: &[Bet],
        liquidities: &[LiquidityProvision],
    ) -> PayoutResult<PayoutInfo> {
        let open_bets: Vec<Bet>;
        let bets = if plan.settles_open_bets_only() {
            open_bets = bets.iter().filter(|b| b.is_open()).cloned().collect();
            &open_bets[..]
        } else {
            bets
        };

        let fees = &contract.collected_fees;
        let config = &self.config;
        let info = match plan {
            SettlementPlan::FixedStandard { state, winner } => {
                standard_fixed_payouts(*winner, state, fees, bets, liquidities, config)?
            }
            SettlementPlan::FixedMkt { state, probability } => {
                mkt_fixed_payouts(*probability, state, fees, bets, liquidities, config)?
            }
            SettlementPlan::FixedCancel => fixed_cancel_payouts(bets, liquidities),
            SettlementPlan::FixedMulti { state, resolutions } => {
                self.check_weight_drift(resolutions);
                multi_fixed_payouts(state, fees, resolutions, bets, liquidities, config)?
            }
            SettlementPlan::DpmStandard { state, outcome } => {
                dpm_standard_payouts(outcome, state, fees, bets, &config.dpm_fees)
            }
            SettlementPlan::DpmMulti { state, resolutions } => {
                dpm_multi_payouts(resolutions, state, fees, bets, &config.dpm_fees)
            }
            SettlementPlan::DpmCancel => dpm_cancel_payouts(bets),
        };

        debug!(
            contract_id = %contract.id,
            plan = plan.name(),
            bettor_total = info.bettor_total(),
            liquidity_total = info.liquidity_total(),
            creator_payout = info.creator_payout,
            "payouts computed"
        );
        Ok(info)
    }

    fn check_weight_drift(&self, resolutions: &Resolutions) {
        if !self.config.warn_on_weight_drift {
            return;
        }
        let total: f64 = resolutions.values().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_EPSILON {
            warn!(total, "multi-outcome resolution weights do not sum to 1");
        }
    }
}

/// Compute payouts with the default configuration.
pub fn compute_payouts(
    outcome: Option<&str>,
    contract: &Contract,
    bets: &[Bet],
    liquidities: &[LiquidityProvision],
    resolutions: Option<&Resolutions>,
    resolution_probability: Option<f64>,
) -> PayoutResult<PayoutInfo> {
    PayoutEngine::default().compute_payouts(
        outcome,
        contract,
        bets,
        liquidities,
        resolutions,
        resolution_probability,
    )
}
