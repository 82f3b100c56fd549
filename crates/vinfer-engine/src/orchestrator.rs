//! The job orchestrator.
//!
//! Drives one inference job through its status machine:
//! `pending -> processing -> completed -> verified | failed`. Execution and
//! attestation are delegated to the injected capabilities; every status
//! change is persisted before the next step runs.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use vinfer_core::{AiModel, InferenceJob, JobStatus};
use vinfer_store::{JobRepository, ModelRepository, ProofRepository};

use crate::attestation::{AnchorReceipt, AttestationService, ProofBundle};
use crate::error::{EngineError, EngineResult};
use crate::runner::{InferenceOutcome, InferenceRunner};

/// Drives the inference job lifecycle end to end.
#[derive(Clone)]
pub struct JobOrchestrator {
    jobs: JobRepository,
    models: ModelRepository,
    proofs: ProofRepository,
    runner: Arc<dyn InferenceRunner>,
    attestor: Arc<dyn AttestationService>,
}

impl JobOrchestrator {
    /// Create an orchestrator over the given repositories and capabilities.
    #[must_use]
    pub fn new(
        jobs: JobRepository,
        models: ModelRepository,
        proofs: ProofRepository,
        runner: Arc<dyn InferenceRunner>,
        attestor: Arc<dyn AttestationService>,
    ) -> Self {
        Self {
            jobs,
            models,
            proofs,
            runner,
            attestor,
        }
    }

    /// Create a job for a model and advance it to processing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the model does not resolve.
    pub async fn create(
        &self,
        model_id: &str,
        user_id: &str,
        input_data: Value,
    ) -> EngineResult<InferenceJob> {
        self.resolve_model(model_id).await?;
        let mut job = InferenceJob::new(model_id, user_id, input_data);
        self.jobs.create(&job).await?;
        job.transition_to(JobStatus::Processing)?;
        self.jobs.save(&job).await?;
        Ok(job)
    }

    /// Run one inference end to end: create, execute, attest (when
    /// enabled), complete.
    ///
    /// A failure during execution or attestation marks the job failed with
    /// the error recorded in `verification_status`, then propagates.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the model does not resolve,
    /// [`EngineError::UnsupportedModel`] / [`EngineError::Inference`] from
    /// the runner, or [`EngineError::Attestation`] from the attestor.
    pub async fn run(
        &self,
        model_id: &str,
        user_id: &str,
        input_data: Value,
        use_attestation: bool,
    ) -> EngineResult<InferenceJob> {
        let model = self.resolve_model(model_id).await?;
        let mut job = self.create(model_id, user_id, input_data).await?;
        info!(job_id = %job.id, model_id = %model_id, use_attestation, "job started");

        match self.execute(&model, &job, use_attestation).await {
            Ok((outcome, attested)) => {
                job.transition_to(JobStatus::Completed)?;
                job.output_data = Some(outcome.output);
                job.latency_ms = Some(outcome.latency_ms);
                job.completed_at = Some(Utc::now());
                if let Some((bundle, receipt)) = attested {
                    job.proof_hash = Some(bundle.proof_hash);
                    job.tx_hash = Some(receipt.tx_hash);
                }
                self.jobs.save(&job).await?;
                self.models.record_inference(&model.id, outcome.latency_ms).await?;
                info!(job_id = %job.id, latency_ms = outcome.latency_ms, "job completed");
                Ok(job)
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "job failed mid-run");
                job.transition_to(JobStatus::Failed)?;
                job.verification_status = Some(err.to_string());
                self.jobs.save(&job).await?;
                Err(err)
            }
        }
    }

    /// Verify a completed job's proof, advancing the job to verified or
    /// failed and stamping the proof record.
    ///
    /// An attestor failure propagates before any status change, leaving
    /// the job completed and retryable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the job or its proof does not
    /// resolve.
    pub async fn verify(&self, job_id: &str) -> EngineResult<InferenceJob> {
        let mut job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "job",
                id: job_id.to_string(),
            })?;
        let mut proof = self
            .proofs
            .get_by_job(job_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "proof",
                id: job_id.to_string(),
            })?;

        let outcome = self
            .attestor
            .verify(&proof.proof_hash, &proof.circuit_hash, &proof.verification_key)
            .await?;

        let target = if outcome.is_valid {
            JobStatus::Verified
        } else {
            JobStatus::Failed
        };
        job.transition_to(target)?;
        job.verification_status =
            Some(if outcome.is_valid { "verified" } else { "failed" }.to_string());
        self.jobs.save(&job).await?;

        proof.is_valid = outcome.is_valid;
        proof.verified_at = Some(Utc::now());
        self.proofs.save(&proof).await?;

        info!(job_id = %job_id, is_valid = outcome.is_valid, message = %outcome.message, "job verified");
        Ok(job)
    }

    async fn resolve_model(&self, model_id: &str) -> EngineResult<AiModel> {
        self.models
            .get(model_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: "model",
                id: model_id.to_string(),
            })
    }

    async fn execute(
        &self,
        model: &AiModel,
        job: &InferenceJob,
        use_attestation: bool,
    ) -> EngineResult<(InferenceOutcome, Option<(ProofBundle, AnchorReceipt)>)> {
        let outcome = self.runner.run(model, &job.input_data).await?;
        if !use_attestation {
            return Ok((outcome, None));
        }
        let bundle = self
            .attestor
            .generate(&job.id, &model.id, &job.input_data, &outcome.output)
            .await?;
        let receipt = self.attestor.anchor(&job.id, &bundle.proof_hash).await?;
        Ok((outcome, Some((bundle, receipt))))
    }
}
