//! Error surface exposed to the route layer.
//!
//! Inner crate errors are flattened into a single error carrying a machine
//! kind and a human-readable message, so callers can branch without
//! depending on the inner crates.

use std::fmt;

use thiserror::Error;
use vinfer_core::CoreError;
use vinfer_engine::EngineError;
use vinfer_market::MarketError;
use vinfer_store::StoreError;

/// Result type alias for platform operations.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// A required field is missing or malformed.
    InvalidInput,
    /// No runner matches the model type and input shape.
    UnsupportedModel,
    /// An escrow lock exceeds the buyer's balance.
    InsufficientBalance,
    /// A purchase has no remaining inference credits.
    CreditsExhausted,
    /// The inference runner failed.
    InferenceError,
    /// Proof generation, anchoring, or verification failed.
    AttestationError,
    /// Anything unclassified.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::UnsupportedModel => "unsupported_model",
            Self::InsufficientBalance => "insufficient_balance",
            Self::CreditsExhausted => "credits_exhausted",
            Self::InferenceError => "inference_error",
            Self::AttestationError => "attestation_error",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// A platform failure: machine kind plus human-readable message.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct PlatformError {
    kind: ErrorKind,
    message: String,
}

impl PlatformError {
    /// Create an error from a kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// The machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CoreError> for PlatformError {
    fn from(err: CoreError) -> Self {
        let kind = match &err {
            CoreError::InvalidAmount { .. } | CoreError::InvalidTransition { .. } => {
                ErrorKind::InvalidInput
            }
            CoreError::CreditsExhausted { .. } => ErrorKind::CreditsExhausted,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<StoreError> for PlatformError {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorKind::Unknown, err.to_string())
    }
}

impl From<EngineError> for PlatformError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => Self::new(ErrorKind::NotFound, err.to_string()),
            EngineError::UnsupportedModel { .. } => {
                Self::new(ErrorKind::UnsupportedModel, err.to_string())
            }
            EngineError::Inference { .. } => Self::new(ErrorKind::InferenceError, err.to_string()),
            EngineError::Attestation { .. } => {
                Self::new(ErrorKind::AttestationError, err.to_string())
            }
            EngineError::Core(inner) => inner.into(),
            EngineError::Store(inner) => inner.into(),
        }
    }
}

impl From<MarketError> for PlatformError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::NotFound { .. } => Self::new(ErrorKind::NotFound, err.to_string()),
            MarketError::InvalidInput { .. } => {
                Self::new(ErrorKind::InvalidInput, err.to_string())
            }
            MarketError::InsufficientBalance { .. } => {
                Self::new(ErrorKind::InsufficientBalance, err.to_string())
            }
            MarketError::Core(inner) => inner.into(),
            MarketError::Engine(inner) => inner.into(),
            MarketError::Store(inner) => inner.into(),
        }
    }
}
