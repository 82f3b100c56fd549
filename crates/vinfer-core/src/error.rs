//! Error types for the shared data model.

use thiserror::Error;

/// Result type alias for data model operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in data model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid amount.
    #[error("invalid amount: {message}")]
    InvalidAmount {
        /// Description of the amount error.
        message: String,
    },

    /// Invalid status transition.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        /// Entity kind whose status machine rejected the transition.
        entity: &'static str,
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
    },

    /// A purchase has no remaining inference credits.
    #[error("no inferences remaining on purchase {purchase_id}")]
    CreditsExhausted {
        /// The exhausted purchase.
        purchase_id: String,
    },
}
