//! Inference job repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use vinfer_core::{InferenceJob, JobStatus};

use crate::error::StoreResult;
use crate::index::{append_to_index, fetch_many, read_id_list, read_record, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// Partial update for a job record.
///
/// Status values set here are persisted as-is; callers that need the
/// lifecycle guard go through [`InferenceJob::transition_to`] and
/// [`JobRepository::save`] instead.
#[derive(Debug, Default, Clone)]
pub struct JobUpdate {
    /// New status.
    pub status: Option<JobStatus>,
    /// Output payload.
    pub output_data: Option<Value>,
    /// Proof handle.
    pub proof_hash: Option<String>,
    /// Verification outcome.
    pub verification_status: Option<String>,
    /// Anchoring transaction handle.
    pub tx_hash: Option<String>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Execution latency.
    pub latency_ms: Option<u64>,
}

/// CRUD and index maintenance for [`InferenceJob`] records.
///
/// Jobs are indexed per user (`jobs:user:<id>`), per model
/// (`jobs:model:<id>`), and globally (`jobs:all`), each list ordered by
/// creation.
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn KeyValueStore>,
}

impl JobRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a new job and append it to the user, model, and global
    /// indices.
    pub async fn create(&self, job: &InferenceJob) -> StoreResult<()> {
        write_record(&*self.store, &keys::job(&job.id), job).await?;
        append_to_index(&*self.store, &keys::jobs_by_user(&job.user_id), &job.id).await?;
        append_to_index(&*self.store, &keys::jobs_by_model(&job.model_id), &job.id).await?;
        append_to_index(&*self.store, keys::ALL_JOBS, &job.id).await?;
        debug!(job_id = %job.id, model_id = %job.model_id, "job created");
        Ok(())
    }

    /// Fetch a job by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<InferenceJob>> {
        read_record(&*self.store, &keys::job(id)).await
    }

    /// Overwrite a job's primary record. Index membership never changes
    /// after creation.
    pub async fn save(&self, job: &InferenceJob) -> StoreResult<()> {
        write_record(&*self.store, &keys::job(&job.id), job).await
    }

    /// Merge a partial update onto a job and persist it.
    ///
    /// Returns `None` if the job does not exist.
    pub async fn update(&self, id: &str, update: JobUpdate) -> StoreResult<Option<InferenceJob>> {
        let Some(mut job) = self.get(id).await? else {
            return Ok(None);
        };
        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(output_data) = update.output_data {
            job.output_data = Some(output_data);
        }
        if let Some(proof_hash) = update.proof_hash {
            job.proof_hash = Some(proof_hash);
        }
        if let Some(verification_status) = update.verification_status {
            job.verification_status = Some(verification_status);
        }
        if let Some(tx_hash) = update.tx_hash {
            job.tx_hash = Some(tx_hash);
        }
        if let Some(completed_at) = update.completed_at {
            job.completed_at = Some(completed_at);
        }
        if let Some(latency_ms) = update.latency_ms {
            job.latency_ms = Some(latency_ms);
        }
        self.save(&job).await?;
        Ok(Some(job))
    }

    /// All jobs submitted by a user, in creation order.
    pub async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<InferenceJob>> {
        let ids = read_id_list(&*self.store, &keys::jobs_by_user(user_id)).await?;
        fetch_many(&*self.store, &ids, keys::job).await
    }

    /// All jobs run against a model, in creation order.
    pub async fn list_by_model(&self, model_id: &str) -> StoreResult<Vec<InferenceJob>> {
        let ids = read_id_list(&*self.store, &keys::jobs_by_model(model_id)).await?;
        fetch_many(&*self.store, &ids, keys::job).await
    }

    /// All jobs, in creation order.
    pub async fn list_all(&self) -> StoreResult<Vec<InferenceJob>> {
        let ids = read_id_list(&*self.store, keys::ALL_JOBS).await?;
        fetch_many(&*self.store, &ids, keys::job).await
    }
}
