//! Error types for the marketplace layer.

use thiserror::Error;
use vinfer_core::{CoreError, Credits};
use vinfer_engine::EngineError;
use vinfer_store::StoreError;

/// Result type alias for marketplace operations.
pub type MarketResult<T> = std::result::Result<T, MarketError>;

/// Errors that can occur in marketplace operations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind that failed to resolve.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A required field is missing or malformed.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// An escrow lock exceeds the buyer's balance.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// The buyer's current balance.
        have: Credits,
        /// The amount the lock required.
        need: Credits,
    },

    /// A status machine rejected a transition or credits ran out.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The job run delegated to the engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MarketError {
    /// Create an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_display() {
        let err = MarketError::InsufficientBalance {
            have: Credits::credits(1.0),
            need: Credits::credits(6.0),
        };
        let text = err.to_string();
        assert!(text.contains("insufficient balance"));
        assert!(text.contains("6 credits"));
    }
}
