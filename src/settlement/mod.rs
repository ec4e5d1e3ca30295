//! Settlement Engine
//!
//! Computes what every bettor, liquidity provider, and contract creator
//! receives when a prediction-market contract resolves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PayoutEngine                             │
//! │  (validates snapshot, resolves SettlementPlan, runs it)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌─────────────┐        ┌─────────────┐        ┌─────────────┐
//! │ cpmm        │        │ dpm         │        │ cancel      │
//! │ YES/NO/MKT/ │        │ standard/   │        │ refunds     │
//! │ multi       │        │ weighted    │        │             │
//! └──────┬──────┘        └──────┬──────┘        └──────┬──────┘
//!        │                      │                      │
//!        ▼                      │                      │
//! ┌─────────────┐               │                      │
//! │ liquidity   │               │                      │
//! │ apportion   │               │                      │
//! └──────┬──────┘               │                      │
//!        └──────────────────────┼──────────────────────┘
//!                               ▼
//!                        ┌─────────────┐      ┌─────────────┐
//!                        │ PayoutInfo  │─────▶│ aggregate   │
//!                        │ (report)    │      │ + loans     │
//!                        └─────────────┘      └─────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Pure**: no I/O, no clock, no mutation of inputs; retries are bit-identical.
//! - **All or nothing**: invalid input fails before any payout is computed.
//! - **Exact liquidity split**: provider payouts sum to the terminal pool in
//!   fixed-point units; the residual unit goes to the earliest contributor.
//! - **No double payment**: DPM settles open bets only.

pub mod aggregate;
pub mod amount;
pub mod config;
pub mod cpmm;
pub mod dispatch;
pub mod dpm;
pub mod error;
pub mod fees;
pub mod liquidity;
pub mod loans;
pub mod model;
pub mod snapshot;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use aggregate::{group_payouts_by_user, net_payouts_by_user, settle_by_user, UserSettlement};
pub use amount::{from_amount, to_amount, Amount, AMOUNT_SCALE};
pub use config::SettlementConfig;
pub use dispatch::{compute_payouts, PayoutEngine, SettlementPlan};
pub use error::{PayoutError, PayoutResult};
pub use fees::{DpmFeeSchedule, Fees};
pub use liquidity::apportion_liquidity;
pub use loans::{loan_payouts, outstanding_loans, sale_loan_repayment};
pub use model::{
    Answer, Bet, BetSale, BinaryOutcome, Contract, CpmmPool, CpmmState, DpmState,
    LiquidityProvision, Mechanism, MultiCpmmState, OutcomeType, Payout, PayoutInfo, Resolutions,
    UserId,
};
pub use snapshot::{SettlementReport, SettlementSnapshot};
