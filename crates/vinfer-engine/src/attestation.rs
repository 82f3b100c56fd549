//! Attestation capability and the built-in hash attestor.
//!
//! Attestation is treated as an opaque producer: `generate` yields a proof
//! bundle, `anchor` yields a transaction handle, `verify` yields a
//! pass/fail verdict. The built-in [`HashAttestor`] simulates a ZK proof
//! system by deriving 64-char hex digests over the job's input and output.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};
use vinfer_core::ZkProof;
use vinfer_store::ProofRepository;

use crate::error::{EngineError, EngineResult};

/// Expected hex length of every hash the attestor produces.
pub const HASH_HEX_LEN: usize = 64;

/// Proof circuit revision baked into the circuit hash.
const PROOF_VERSION: &str = "v1";

/// The artifacts produced by proof generation.
#[derive(Debug, Clone)]
pub struct ProofBundle {
    /// Id of the persisted proof record.
    pub proof_id: String,
    /// Master proof hash over input, output, model, and job.
    pub proof_hash: String,
    /// Circuit identity hash.
    pub circuit_hash: String,
    /// Verification key.
    pub verification_key: String,
}

/// The result of anchoring a proof.
#[derive(Debug, Clone)]
pub struct AnchorReceipt {
    /// Anchoring transaction hash (`0x`-prefixed).
    pub tx_hash: String,
    /// Block the transaction landed in, when known.
    pub block_number: Option<u64>,
    /// Gas consumed, when known.
    pub gas_used: Option<u64>,
}

/// The verdict of proof verification.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    /// Whether the proof checks out.
    pub is_valid: bool,
    /// Human-readable verdict.
    pub message: String,
}

/// Produces, anchors, and verifies inference proofs.
#[async_trait]
pub trait AttestationService: Send + Sync {
    /// Generate and persist a proof over a job's input/output pair.
    async fn generate(
        &self,
        job_id: &str,
        model_id: &str,
        input: &Value,
        output: &Value,
    ) -> EngineResult<ProofBundle>;

    /// Anchor a proof hash, returning the transaction handle.
    async fn anchor(&self, job_id: &str, proof_hash: &str) -> EngineResult<AnchorReceipt>;

    /// Check a proof's integrity.
    async fn verify(
        &self,
        proof_hash: &str,
        circuit_hash: &str,
        verification_key: &str,
    ) -> EngineResult<VerifyOutcome>;
}

/// Hash-based attestation simulating a ZK proof system.
///
/// Proof records are persisted through the proof repository; anchoring is
/// simulated with a derived transaction hash and a random block number.
#[derive(Clone)]
pub struct HashAttestor {
    proofs: ProofRepository,
}

impl HashAttestor {
    /// Create an attestor persisting through the given proof repository.
    #[must_use]
    pub fn new(proofs: ProofRepository) -> Self {
        Self { proofs }
    }

    fn digest(data: &str) -> String {
        blake3::hash(data.as_bytes()).to_hex().to_string()
    }

    fn digest_value(value: &Value) -> EngineResult<String> {
        let raw = serde_json::to_string(value)
            .map_err(|e| EngineError::attestation(format!("cannot encode payload: {e}")))?;
        Ok(Self::digest(&raw))
    }
}

#[async_trait]
impl AttestationService for HashAttestor {
    async fn generate(
        &self,
        job_id: &str,
        model_id: &str,
        input: &Value,
        output: &Value,
    ) -> EngineResult<ProofBundle> {
        let input_hash = Self::digest_value(input)?;
        let output_hash = Self::digest_value(output)?;
        let model_hash = Self::digest(model_id);
        let timestamp = Utc::now().to_rfc3339();

        let proof_hash =
            Self::digest(&format!("{input_hash}{output_hash}{model_hash}{job_id}{timestamp}"));
        let circuit_hash = Self::digest(&format!("circuit-{model_id}-{PROOF_VERSION}"));
        let verification_key = Self::digest(&format!("vk-{circuit_hash}-{timestamp}"));

        let proof = ZkProof::new(job_id, &proof_hash, &circuit_hash, &verification_key, true);
        self.proofs.create(&proof).await?;
        info!(proof_id = %proof.id, job_id = %job_id, "proof generated");

        Ok(ProofBundle {
            proof_id: proof.id,
            proof_hash,
            circuit_hash,
            verification_key,
        })
    }

    async fn anchor(&self, job_id: &str, proof_hash: &str) -> EngineResult<AnchorReceipt> {
        let nonce = Utc::now().timestamp_millis();
        let tx_hash = format!("0x{}", Self::digest(&format!("tx-{job_id}-{proof_hash}-{nonce}")));
        let block_number = rand::thread_rng().gen_range(5_000_000..6_000_000);
        debug!(job_id = %job_id, tx_hash = %tx_hash, block_number, "proof anchored");
        Ok(AnchorReceipt {
            tx_hash,
            block_number: Some(block_number),
            gas_used: Some(21_000),
        })
    }

    async fn verify(
        &self,
        proof_hash: &str,
        circuit_hash: &str,
        verification_key: &str,
    ) -> EngineResult<VerifyOutcome> {
        if proof_hash.len() != HASH_HEX_LEN {
            return Ok(VerifyOutcome {
                is_valid: false,
                message: "invalid proof hash format".to_string(),
            });
        }
        if circuit_hash.len() != HASH_HEX_LEN {
            return Ok(VerifyOutcome {
                is_valid: false,
                message: "invalid circuit hash format".to_string(),
            });
        }
        if verification_key.len() != HASH_HEX_LEN {
            return Ok(VerifyOutcome {
                is_valid: false,
                message: "invalid verification key format".to_string(),
            });
        }
        Ok(VerifyOutcome {
            is_valid: true,
            message: "proof verified successfully".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use vinfer_store::MemoryStore;

    fn attestor() -> (HashAttestor, ProofRepository) {
        let store: Arc<dyn vinfer_store::KeyValueStore> = MemoryStore::shared();
        let proofs = ProofRepository::new(store);
        (HashAttestor::new(proofs.clone()), proofs)
    }

    #[tokio::test]
    async fn generate_persists_a_valid_proof() {
        let (attestor, proofs) = attestor();
        let bundle = attestor
            .generate("job-1", "model-1", &json!({"text": "hi"}), &json!({"label": "POSITIVE"}))
            .await
            .expect("generate");

        assert_eq!(bundle.proof_hash.len(), HASH_HEX_LEN);
        assert_eq!(bundle.circuit_hash.len(), HASH_HEX_LEN);
        assert_eq!(bundle.verification_key.len(), HASH_HEX_LEN);

        let stored = proofs
            .get_by_job("job-1")
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(stored.id, bundle.proof_id);
        assert_eq!(stored.proof_hash, bundle.proof_hash);
        assert!(stored.is_valid);
    }

    #[tokio::test]
    async fn anchor_produces_prefixed_tx_hash() {
        let (attestor, _) = attestor();
        let receipt = attestor
            .anchor("job-1", &"a".repeat(HASH_HEX_LEN))
            .await
            .expect("anchor");
        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(receipt.tx_hash.len(), 2 + HASH_HEX_LEN);
        let block = receipt.block_number.expect("block");
        assert!((5_000_000..6_000_000).contains(&block));
        assert_eq!(receipt.gas_used, Some(21_000));
    }

    #[tokio::test]
    async fn verify_accepts_well_formed_hashes() {
        let (attestor, _) = attestor();
        let good = "a".repeat(HASH_HEX_LEN);
        let outcome = attestor.verify(&good, &good, &good).await.expect("verify");
        assert!(outcome.is_valid);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_length_proof_hash() {
        let (attestor, _) = attestor();
        let good = "a".repeat(HASH_HEX_LEN);
        let outcome = attestor
            .verify("deadbeef", &good, &good)
            .await
            .expect("verify");
        assert!(!outcome.is_valid);
        assert!(outcome.message.contains("proof hash"));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_length_circuit_and_key() {
        let (attestor, _) = attestor();
        let good = "a".repeat(HASH_HEX_LEN);

        let outcome = attestor.verify(&good, "short", &good).await.expect("verify");
        assert!(!outcome.is_valid);
        assert!(outcome.message.contains("circuit"));

        let outcome = attestor.verify(&good, &good, "short").await.expect("verify");
        assert!(!outcome.is_valid);
        assert!(outcome.message.contains("verification key"));
    }
}
