//! Zero-knowledge proof records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::entity_id;

/// An attestation record for one inference job (1:1 with the job).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZkProof {
    /// Unique proof id.
    pub id: String,
    /// The attested job.
    pub job_id: String,
    /// Proof artifact hash.
    pub proof_hash: String,
    /// Circuit identity hash.
    pub circuit_hash: String,
    /// Verification key.
    pub verification_key: String,
    /// Whether the proof is currently considered valid.
    pub is_valid: bool,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Verification timestamp, once verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// Anchoring transaction handle, if anchored.
    pub tx_hash: Option<String>,
}

impl ZkProof {
    /// Create a new proof record.
    #[must_use]
    pub fn new(
        job_id: impl Into<String>,
        proof_hash: impl Into<String>,
        circuit_hash: impl Into<String>,
        verification_key: impl Into<String>,
        is_valid: bool,
    ) -> Self {
        Self {
            id: entity_id("proof"),
            job_id: job_id.into(),
            proof_hash: proof_hash.into(),
            circuit_hash: circuit_hash.into(),
            verification_key: verification_key.into(),
            is_valid,
            generated_at: Utc::now(),
            verified_at: None,
            tx_hash: None,
        }
    }
}
