//! Inference job records and their status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CoreError;
use crate::id::entity_id;

/// The lifecycle status of an inference job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job created, not yet picked up.
    Pending,
    /// Job is executing (or awaiting attestation).
    Processing,
    /// Execution finished and output persisted.
    Completed,
    /// Proof verification succeeded.
    Verified,
    /// Execution or verification failed.
    Failed,
}

impl JobStatus {
    /// Checks if a transition to the target status is valid.
    ///
    /// A job advances `Pending -> Processing -> Completed -> Verified`;
    /// `Failed` is reachable from `Processing` (mid-run failure) and from
    /// `Completed` (failed verification).
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use JobStatus::{Completed, Failed, Pending, Processing, Verified};

        matches!(
            (self, target),
            (Pending, Processing) | (Processing, Completed | Failed) | (Completed, Verified | Failed)
        )
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Verified => write!(f, "verified"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A single inference run against a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceJob {
    /// Unique job id.
    pub id: String,
    /// The model being run.
    pub model_id: String,
    /// The user the run is attributed to.
    pub user_id: String,
    /// Input payload.
    pub input_data: Value,
    /// Output payload, present once completed.
    pub output_data: Option<Value>,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Proof handle, present when attestation ran.
    pub proof_hash: Option<String>,
    /// Outcome recorded by verification ("verified" / "failed") or a
    /// failure description for mid-run errors.
    pub verification_status: Option<String>,
    /// Anchoring transaction handle, present when attestation ran.
    pub tx_hash: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Execution latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl InferenceJob {
    /// Create a new pending job.
    #[must_use]
    pub fn new(model_id: impl Into<String>, user_id: impl Into<String>, input_data: Value) -> Self {
        Self {
            id: entity_id("job"),
            model_id: model_id.into(),
            user_id: user_id.into(),
            input_data,
            output_data: None,
            status: JobStatus::Pending,
            proof_hash: None,
            verification_status: None,
            tx_hash: None,
            created_at: Utc::now(),
            completed_at: None,
            latency_ms: None,
        }
    }

    /// Attempt a status transition, rejecting anything the status machine
    /// does not allow.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for a disallowed transition.
    pub fn transition_to(&mut self, target: JobStatus) -> Result<(), CoreError> {
        if self.status.can_transition_to(&target) {
            self.status = target;
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: "job",
                from: self.status.to_string(),
                to: target.to_string(),
            })
        }
    }
}
