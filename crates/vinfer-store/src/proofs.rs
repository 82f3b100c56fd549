//! Proof repository.

use std::sync::Arc;

use tracing::debug;
use vinfer_core::ZkProof;

use crate::error::StoreResult;
use crate::index::{read_record, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// CRUD and job lookup for [`ZkProof`] records.
///
/// The job mapping (`proofs:job:<id>`) stores the bare proof id; each job
/// has at most one proof.
#[derive(Clone)]
pub struct ProofRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ProofRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a new proof and register its job mapping.
    pub async fn create(&self, proof: &ZkProof) -> StoreResult<()> {
        write_record(&*self.store, &keys::proof(&proof.id), proof).await?;
        self.store
            .set(&keys::proof_by_job(&proof.job_id), &proof.id)
            .await?;
        debug!(proof_id = %proof.id, job_id = %proof.job_id, "proof stored");
        Ok(())
    }

    /// Fetch a proof by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<ZkProof>> {
        read_record(&*self.store, &keys::proof(id)).await
    }

    /// Fetch the proof attached to a job, if any.
    pub async fn get_by_job(&self, job_id: &str) -> StoreResult<Option<ZkProof>> {
        match self.store.get(&keys::proof_by_job(job_id)).await? {
            Some(id) => self.get(&id).await,
            None => Ok(None),
        }
    }

    /// Overwrite a proof's primary record.
    pub async fn save(&self, proof: &ZkProof) -> StoreResult<()> {
        write_record(&*self.store, &keys::proof(&proof.id), proof).await
    }
}
