//! Payout Engine Library
//!
//! Settlement core for prediction-market contracts, used by the `settle`
//! binary and by integration tests.

pub mod settlement;

// Re-export the engine entry points at crate root
pub use settlement::{compute_payouts, PayoutEngine, PayoutError, PayoutInfo, SettlementConfig};
