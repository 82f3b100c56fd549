//! The platform service.
//!
//! Wires repositories, the execution engine, and the marketplace into one
//! facade for a route layer to call. Every operation returns a
//! [`PlatformError`] carrying a machine kind, so HTTP shaping stays out of
//! the core.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use vinfer_core::{AiModel, Credits, InferenceJob, JobStatus, MarketplaceListing, ModelType, Purchase, User};
use vinfer_engine::{
    AttestationService, HashAttestor, InferenceRunner, JobOrchestrator, SimulatedRunner,
};
use vinfer_market::{EscrowLedger, ListingFilter, MarketplaceOrchestrator};
use vinfer_store::{
    JobRepository, KeyValueStore, ListingRepository, ListingUpdate, ModelRepository, ModelUpdate,
    ProofRepository, PurchaseRepository, UserRepository,
};

use crate::config::PlatformConfig;
use crate::error::{PlatformError, PlatformResult};

/// Filter for listing jobs.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    /// Restrict to jobs submitted by one user.
    pub user_id: Option<String>,
    /// Restrict to jobs run against one model.
    pub model_id: Option<String>,
    /// Cap the number of jobs returned (most recent first).
    pub limit: Option<usize>,
}

/// Everything a user dashboard shows.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    /// The user the dashboard belongs to.
    pub user: User,
    /// Models the user owns.
    pub models: Vec<AiModel>,
    /// The user's most recent jobs, newest first.
    pub recent_jobs: Vec<InferenceJob>,
    /// The user's purchases.
    pub purchases: Vec<Purchase>,
}

/// Aggregate platform counters.
#[derive(Debug, Serialize)]
pub struct PlatformStats {
    /// Registered models.
    pub total_models: usize,
    /// Jobs ever created.
    pub total_inferences: usize,
    /// Jobs currently completed (not yet verified).
    pub completed_inferences: usize,
    /// Jobs verified or carrying a proof.
    pub verified_inferences: usize,
    /// Listings currently purchasable.
    pub active_listings: usize,
    /// Verified as a percentage of completed, two decimal places.
    pub verification_rate: f64,
}

/// The platform facade.
#[derive(Clone)]
pub struct Platform {
    config: PlatformConfig,
    users: UserRepository,
    models: ModelRepository,
    jobs: JobRepository,
    listings: ListingRepository,
    purchases: PurchaseRepository,
    orchestrator: JobOrchestrator,
    market: MarketplaceOrchestrator,
}

impl Platform {
    /// Wire a platform over a store with the built-in simulated runner and
    /// hash attestor.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: PlatformConfig) -> Self {
        let proofs = ProofRepository::new(Arc::clone(&store));
        Self::with_capabilities(
            store,
            config,
            Arc::new(SimulatedRunner::new()),
            Arc::new(HashAttestor::new(proofs)),
        )
    }

    /// Wire a platform with custom execution and attestation backends.
    #[must_use]
    pub fn with_capabilities(
        store: Arc<dyn KeyValueStore>,
        config: PlatformConfig,
        runner: Arc<dyn InferenceRunner>,
        attestor: Arc<dyn AttestationService>,
    ) -> Self {
        let users = UserRepository::new(Arc::clone(&store));
        let models = ModelRepository::new(Arc::clone(&store));
        let jobs = JobRepository::new(Arc::clone(&store));
        let listings = ListingRepository::new(Arc::clone(&store));
        let purchases = PurchaseRepository::new(Arc::clone(&store));
        let proofs = ProofRepository::new(Arc::clone(&store));

        let orchestrator = JobOrchestrator::new(
            jobs.clone(),
            models.clone(),
            proofs,
            runner,
            attestor,
        );
        let ledger = EscrowLedger::new(users.clone(), purchases.clone());
        let market = MarketplaceOrchestrator::new(
            listings.clone(),
            purchases.clone(),
            models.clone(),
            ledger,
            orchestrator.clone(),
        );

        Self {
            config,
            users,
            models,
            jobs,
            listings,
            purchases,
            orchestrator,
            market,
        }
    }

    // --- users ---

    /// Register a user with the configured starting balance.
    pub async fn create_user(
        &self,
        wallet_address: &str,
        username: Option<String>,
    ) -> PlatformResult<User> {
        if wallet_address.is_empty() {
            return Err(PlatformError::invalid_input("wallet_address is required"));
        }
        Ok(self
            .users
            .create(wallet_address, username, self.config.starting_balance)
            .await?)
    }

    /// Fetch a user by id.
    pub async fn get_user(&self, user_id: &str) -> PlatformResult<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("user not found: {user_id}")))
    }

    /// Fetch the user behind a wallet, creating one on first sight.
    pub async fn get_or_create_user(&self, wallet_address: &str) -> PlatformResult<User> {
        if let Some(user) = self.users.get_by_wallet(wallet_address).await? {
            return Ok(user);
        }
        self.create_user(wallet_address, None).await
    }

    // --- models ---

    /// Register a model for an existing user.
    pub async fn create_model(
        &self,
        name: &str,
        description: Option<String>,
        model_type: ModelType,
        is_public: bool,
        owner_id: &str,
        metadata: Value,
    ) -> PlatformResult<AiModel> {
        if name.is_empty() {
            return Err(PlatformError::invalid_input("model name is required"));
        }
        self.get_user(owner_id).await?;
        Ok(self
            .models
            .create(name, description, model_type, is_public, owner_id, metadata)
            .await?)
    }

    /// Fetch a model by id.
    pub async fn get_model(&self, model_id: &str) -> PlatformResult<AiModel> {
        self.models
            .get(model_id)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("model not found: {model_id}")))
    }

    /// Apply a partial update to a model.
    pub async fn update_model(
        &self,
        model_id: &str,
        update: ModelUpdate,
    ) -> PlatformResult<AiModel> {
        self.models
            .update(model_id, update)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("model not found: {model_id}")))
    }

    /// Delete a model and scrub it from every index.
    pub async fn delete_model(&self, model_id: &str) -> PlatformResult<()> {
        if self.models.delete(model_id).await? {
            Ok(())
        } else {
            Err(PlatformError::not_found(format!(
                "model not found: {model_id}"
            )))
        }
    }

    /// Models owned by one user, or all models.
    pub async fn list_models(&self, owner_id: Option<&str>) -> PlatformResult<Vec<AiModel>> {
        let models = match owner_id {
            Some(owner) => self.models.list_by_owner(owner).await?,
            None => self.models.list_all().await?,
        };
        Ok(models)
    }

    // --- jobs ---

    /// Create a job without running it; the job is left processing.
    pub async fn create_job(
        &self,
        model_id: &str,
        user_id: &str,
        input_data: Value,
    ) -> PlatformResult<InferenceJob> {
        Ok(self.orchestrator.create(model_id, user_id, input_data).await?)
    }

    /// Fetch a job by id.
    pub async fn get_job(&self, job_id: &str) -> PlatformResult<InferenceJob> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("job not found: {job_id}")))
    }

    /// Jobs matching the filter, newest first when limited.
    pub async fn list_jobs(&self, filter: &JobFilter) -> PlatformResult<Vec<InferenceJob>> {
        let mut jobs = match (&filter.user_id, &filter.model_id) {
            (Some(user_id), _) => self.jobs.list_by_user(user_id).await?,
            (None, Some(model_id)) => self.jobs.list_by_model(model_id).await?,
            (None, None) => self.jobs.list_all().await?,
        };
        if let Some(model_id) = &filter.model_id {
            jobs.retain(|job| &job.model_id == model_id);
        }
        if let Some(limit) = filter.limit {
            jobs.reverse();
            jobs.truncate(limit);
        }
        Ok(jobs)
    }

    /// Run one inference end to end against a model.
    pub async fn run_job(
        &self,
        model_id: &str,
        user_id: &str,
        input_data: Value,
    ) -> PlatformResult<InferenceJob> {
        Ok(self
            .orchestrator
            .run(model_id, user_id, input_data, self.config.use_attestation)
            .await?)
    }

    /// Verify a completed job's proof.
    pub async fn verify_job(&self, job_id: &str) -> PlatformResult<InferenceJob> {
        Ok(self.orchestrator.verify(job_id).await?)
    }

    // --- marketplace ---

    /// List a model on the marketplace.
    pub async fn create_listing(
        &self,
        model_id: &str,
        description: &str,
        price_per_inference: Credits,
        category: Option<String>,
        tags: Vec<String>,
    ) -> PlatformResult<MarketplaceListing> {
        Ok(self
            .market
            .create_listing(model_id, description, price_per_inference, category, tags)
            .await?)
    }

    /// Fetch a listing by id.
    pub async fn get_listing(&self, listing_id: &str) -> PlatformResult<MarketplaceListing> {
        self.listings
            .get(listing_id)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("listing not found: {listing_id}")))
    }

    /// Apply a partial update to a listing.
    pub async fn update_listing(
        &self,
        listing_id: &str,
        update: ListingUpdate,
    ) -> PlatformResult<MarketplaceListing> {
        self.listings
            .update(listing_id, update)
            .await?
            .ok_or_else(|| PlatformError::not_found(format!("listing not found: {listing_id}")))
    }

    /// Active listings matching the filter.
    pub async fn list_listings(
        &self,
        filter: &ListingFilter,
    ) -> PlatformResult<Vec<MarketplaceListing>> {
        Ok(self.market.list_listings(filter).await?)
    }

    /// Buy inference credits against a listing.
    pub async fn purchase(
        &self,
        user_id: &str,
        listing_id: &str,
        inferences_count: u64,
    ) -> PlatformResult<Purchase> {
        Ok(self
            .market
            .purchase(user_id, listing_id, inferences_count)
            .await?)
    }

    /// Consume one purchased credit by running an attested inference.
    pub async fn use_credit(
        &self,
        purchase_id: &str,
        input_data: Value,
    ) -> PlatformResult<(InferenceJob, Purchase)> {
        Ok(self.market.use_credit(purchase_id, input_data).await?)
    }

    /// All purchases made by a user.
    pub async fn list_purchases(&self, user_id: &str) -> PlatformResult<Vec<Purchase>> {
        Ok(self.market.list_purchases(user_id).await?)
    }

    /// Release a purchase's escrowed funds to the seller.
    pub async fn release_escrow(&self, purchase_id: &str) -> PlatformResult<Purchase> {
        Ok(self.market.release(purchase_id).await?)
    }

    /// Refund a purchase's escrowed funds to the buyer.
    pub async fn refund_escrow(&self, purchase_id: &str) -> PlatformResult<Purchase> {
        Ok(self.market.refund(purchase_id).await?)
    }

    // --- aggregates ---

    /// Build the dashboard for one user.
    pub async fn dashboard(&self, user_id: &str) -> PlatformResult<Dashboard> {
        let user = self.get_user(user_id).await?;
        let models = self.models.list_by_owner(user_id).await?;
        let mut recent_jobs = self.jobs.list_by_user(user_id).await?;
        recent_jobs.reverse();
        recent_jobs.truncate(self.config.dashboard_recent_jobs);
        let purchases = self.purchases.list_by_user(user_id).await?;
        Ok(Dashboard {
            user,
            models,
            recent_jobs,
            purchases,
        })
    }

    /// Aggregate counters over models, jobs, and listings.
    pub async fn stats(&self) -> PlatformResult<PlatformStats> {
        let models = self.models.list_all().await?;
        let jobs = self.jobs.list_all().await?;
        let active = self.listings.list_active().await?;

        let completed = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .count();
        let verified = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Verified || j.proof_hash.is_some())
            .count();
        let verification_rate = if completed > 0 {
            (verified as f64 / completed as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        info!(
            total_models = models.len(),
            total_inferences = jobs.len(),
            active_listings = active.len(),
            "stats computed"
        );
        Ok(PlatformStats {
            total_models: models.len(),
            total_inferences: jobs.len(),
            completed_inferences: completed,
            verified_inferences: verified,
            active_listings: active.len(),
            verification_rate,
        })
    }
}
