//! Persisted key layout.
//!
//! Primary records live at `<entity>:<id>`, index lists at
//! `<entity>:<relation>:<id>` (JSON array of ids), and global indices at
//! singleton keys (`jobs:all`, `listings:active`). This layout is preserved
//! for compatibility with existing deployments.

/// Global index of all jobs.
pub const ALL_JOBS: &str = "jobs:all";

/// Global index of all models.
pub const ALL_MODELS: &str = "models:all";

/// Global index of active listings.
pub const ACTIVE_LISTINGS: &str = "listings:active";

/// Primary user record.
#[must_use]
pub fn user(id: &str) -> String {
    format!("users:{id}")
}

/// Wallet address -> user id mapping.
#[must_use]
pub fn user_by_wallet(wallet_address: &str) -> String {
    format!("users:wallet:{wallet_address}")
}

/// Primary model record.
#[must_use]
pub fn model(id: &str) -> String {
    format!("models:{id}")
}

/// Index of models owned by a user.
#[must_use]
pub fn models_by_owner(owner_id: &str) -> String {
    format!("models:owner:{owner_id}")
}

/// Primary job record.
#[must_use]
pub fn job(id: &str) -> String {
    format!("jobs:{id}")
}

/// Index of jobs submitted by a user.
#[must_use]
pub fn jobs_by_user(user_id: &str) -> String {
    format!("jobs:user:{user_id}")
}

/// Index of jobs run against a model.
#[must_use]
pub fn jobs_by_model(model_id: &str) -> String {
    format!("jobs:model:{model_id}")
}

/// Primary listing record.
#[must_use]
pub fn listing(id: &str) -> String {
    format!("listings:{id}")
}

/// Model id -> listing id mapping (at most one listing per model).
#[must_use]
pub fn listing_by_model(model_id: &str) -> String {
    format!("listings:model:{model_id}")
}

/// Index of listings owned by a user.
#[must_use]
pub fn listings_by_owner(owner_id: &str) -> String {
    format!("listings:owner:{owner_id}")
}

/// Primary purchase record.
#[must_use]
pub fn purchase(id: &str) -> String {
    format!("purchases:{id}")
}

/// Index of purchases made by a user.
#[must_use]
pub fn purchases_by_user(user_id: &str) -> String {
    format!("purchases:user:{user_id}")
}

/// Index of purchases against a listing.
#[must_use]
pub fn purchases_by_listing(listing_id: &str) -> String {
    format!("purchases:listing:{listing_id}")
}

/// Primary proof record.
#[must_use]
pub fn proof(id: &str) -> String {
    format!("proofs:{id}")
}

/// Job id -> proof id mapping (1:1).
#[must_use]
pub fn proof_by_job(job_id: &str) -> String {
    format!("proofs:job:{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wire_format() {
        assert_eq!(user("u1"), "users:u1");
        assert_eq!(user_by_wallet("0xabc"), "users:wallet:0xabc");
        assert_eq!(model("m1"), "models:m1");
        assert_eq!(models_by_owner("u1"), "models:owner:u1");
        assert_eq!(job("j1"), "jobs:j1");
        assert_eq!(jobs_by_user("u1"), "jobs:user:u1");
        assert_eq!(jobs_by_model("m1"), "jobs:model:m1");
        assert_eq!(listing("l1"), "listings:l1");
        assert_eq!(listing_by_model("m1"), "listings:model:m1");
        assert_eq!(listings_by_owner("u1"), "listings:owner:u1");
        assert_eq!(purchase("p1"), "purchases:p1");
        assert_eq!(purchases_by_user("u1"), "purchases:user:u1");
        assert_eq!(purchases_by_listing("l1"), "purchases:listing:l1");
        assert_eq!(proof("pr1"), "proofs:pr1");
        assert_eq!(proof_by_job("j1"), "proofs:job:j1");
        assert_eq!(ALL_JOBS, "jobs:all");
        assert_eq!(ALL_MODELS, "models:all");
        assert_eq!(ACTIVE_LISTINGS, "listings:active");
    }
}
