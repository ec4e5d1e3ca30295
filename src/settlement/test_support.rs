//! Builders shared by the settlement unit tests.

use crate::settlement::fees::Fees;
use crate::settlement::model::{
    Answer, Bet, Contract, CpmmPool, CpmmState, DpmState, LiquidityProvision, Mechanism,
    MultiCpmmState, OutcomeType,
};
use chrono::{DateTime, TimeZone, Utc};

pub const CONTRACT_ID: &str = "c1";
pub const CREATOR_ID: &str = "creator";

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn bet(id: &str, user_id: &str, outcome: &str, amount: f64, shares: f64) -> Bet {
    Bet {
        id: id.to_string(),
        user_id: user_id.to_string(),
        contract_id: CONTRACT_ID.to_string(),
        answer_id: None,
        outcome: outcome.to_string(),
        amount,
        shares,
        loan_amount: 0.0,
        is_sold: false,
        sale: None,
        created_time: at(0),
    }
}

pub fn answer_bet(id: &str, user_id: &str, answer_id: &str, outcome: &str, shares: f64) -> Bet {
    Bet {
        answer_id: Some(answer_id.to_string()),
        ..bet(id, user_id, outcome, shares / 2.0, shares)
    }
}

pub fn liquidity(id: &str, user_id: &str, amount: f64, secs: i64) -> LiquidityProvision {
    LiquidityProvision {
        id: id.to_string(),
        user_id: user_id.to_string(),
        contract_id: CONTRACT_ID.to_string(),
        amount,
        created_time: at(secs),
    }
}

pub fn cpmm_state(yes: f64, no: f64) -> CpmmState {
    CpmmState {
        pool: CpmmPool { yes, no },
        p: 0.5,
        subsidy_pool: 0.0,
    }
}

pub fn dpm_state(pool: &[(&str, f64)]) -> DpmState {
    DpmState {
        pool: pool.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        total_shares: Default::default(),
    }
}

pub fn answer(id: &str, pool_yes: f64, pool_no: f64) -> Answer {
    Answer {
        id: id.to_string(),
        text: String::new(),
        pool_yes,
        pool_no,
    }
}

pub fn contract(outcome_type: OutcomeType, mechanism: Mechanism) -> Contract {
    Contract {
        id: CONTRACT_ID.to_string(),
        creator_id: CREATOR_ID.to_string(),
        outcome_type,
        collected_fees: Fees::ZERO,
        mechanism,
    }
}

pub fn cpmm_contract(yes: f64, no: f64) -> Contract {
    contract(OutcomeType::Binary, Mechanism::Cpmm1(cpmm_state(yes, no)))
}

pub fn multi_contract(answers: Vec<Answer>) -> Contract {
    contract(
        OutcomeType::MultipleChoice,
        Mechanism::CpmmMulti1(MultiCpmmState { answers }),
    )
}

pub fn dpm_contract(pool: &[(&str, f64)]) -> Contract {
    contract(OutcomeType::FreeResponse, Mechanism::Dpm2(dpm_state(pool)))
}
