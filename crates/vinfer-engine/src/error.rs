//! Error types for the execution layer.

use thiserror::Error;
use vinfer_core::CoreError;
use vinfer_store::StoreError;

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind that failed to resolve.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// No runner matches the model type and input shape.
    #[error("unsupported model: {message}")]
    UnsupportedModel {
        /// What made the combination unsupported.
        message: String,
    },

    /// The runner failed mid-execution.
    #[error("inference failed: {message}")]
    Inference {
        /// Description of the runner failure.
        message: String,
    },

    /// Proof generation, anchoring, or verification failed.
    #[error("attestation failed: {message}")]
    Attestation {
        /// Description of the attestation failure.
        message: String,
    },

    /// A status machine rejected a transition.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Create an unsupported-model error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            message: message.into(),
        }
    }

    /// Create an inference error.
    #[must_use]
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create an attestation error.
    #[must_use]
    pub fn attestation(message: impl Into<String>) -> Self {
        Self::Attestation {
            message: message.into(),
        }
    }
}
