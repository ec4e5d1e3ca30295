//! Settlement error taxonomy.
//!
//! Both variants are precondition violations in the caller's snapshot. The
//! engine does no I/O, so nothing here is retriable.

/// Settlement error types.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoutError {
    /// Required resolution data is missing or malformed for the requested outcome.
    InvalidInput { reason: String },
    /// The contract's mechanism (or mechanism/outcome pair) has no settlement.
    UnsupportedMechanism {
        mechanism: String,
        outcome: Option<String>,
    },
}

impl PayoutError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedMechanism { .. })
    }
}

impl std::fmt::Display for PayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "Invalid settlement input: {}", reason),
            Self::UnsupportedMechanism { mechanism, outcome } => match outcome {
                Some(outcome) => write!(
                    f,
                    "Payouts not implemented for mechanism {} with outcome {}",
                    mechanism, outcome
                ),
                None => write!(f, "Payouts not implemented for mechanism {}", mechanism),
            },
        }
    }
}

impl std::error::Error for PayoutError {}

pub type PayoutResult<T> = Result<T, PayoutError>;
