//! End-to-end marketplace and inference scenarios against an in-memory
//! store.

use std::sync::Arc;

use serde_json::json;
use vinfer_core::{Credits, EscrowStatus, JobStatus, ModelType, User};
use vinfer_platform::{ErrorKind, JobFilter, Platform, PlatformConfig};
use vinfer_store::{KeyValueStore, MemoryStore, ProofRepository};

struct World {
    platform: Platform,
    store: Arc<dyn KeyValueStore>,
}

fn world() -> World {
    let store: Arc<dyn KeyValueStore> = MemoryStore::shared();
    let platform = Platform::new(Arc::clone(&store), PlatformConfig::default());
    World { platform, store }
}

async fn seller_with_listing(world: &World, price: f64) -> (User, String) {
    let seller = world
        .platform
        .get_or_create_user("0xseller")
        .await
        .expect("seller");
    let model = world
        .platform
        .create_model(
            "sentiment",
            Some("text sentiment".to_string()),
            ModelType::Custom,
            true,
            &seller.id,
            json!({}),
        )
        .await
        .expect("model");
    let listing = world
        .platform
        .create_listing(&model.id, "sentiment as a service", Credits::credits(price), None, vec![])
        .await
        .expect("listing");
    (seller, listing.id)
}

#[tokio::test]
async fn scenario_a_purchase_locks_total_in_escrow() {
    let world = world();
    let (_, listing_id) = seller_with_listing(&world, 2.0).await;
    let buyer = world
        .platform
        .get_or_create_user("0xbuyer")
        .await
        .expect("buyer");

    let purchase = world
        .platform
        .purchase(&buyer.id, &listing_id, 3)
        .await
        .expect("purchase");

    assert!((purchase.total_paid.as_credits() - 6.0).abs() < f64::EPSILON);
    assert_eq!(purchase.escrow_status, EscrowStatus::Locked);

    let buyer = world.platform.get_user(&buyer.id).await.expect("get");
    assert!((buyer.balance.as_credits() - 994.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn scenario_b_last_credit_then_exhausted() {
    let world = world();
    let (_, listing_id) = seller_with_listing(&world, 2.0).await;
    let buyer = world
        .platform
        .get_or_create_user("0xbuyer")
        .await
        .expect("buyer");
    let purchase = world
        .platform
        .purchase(&buyer.id, &listing_id, 1)
        .await
        .expect("purchase");

    let (job, updated) = world
        .platform
        .use_credit(&purchase.id, json!({"text": "wonderful"}))
        .await
        .expect("use credit");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(updated.inferences_remaining, 0);

    let err = world
        .platform
        .use_credit(&purchase.id, json!({"text": "again"}))
        .await
        .expect_err("no credits left");
    assert_eq!(err.kind(), ErrorKind::CreditsExhausted);
}

#[tokio::test]
async fn scenario_c_onnx_without_file_is_unsupported() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("mnist", None, ModelType::Onnx, true, &owner.id, json!({}))
        .await
        .expect("model");

    let err = world
        .platform
        .run_job(&model.id, &owner.id, json!({"image": [0.1, 0.2]}))
        .await
        .expect_err("no runner");
    assert_eq!(err.kind(), ErrorKind::UnsupportedModel);

    // The failed run is recorded, not left processing
    let jobs = world
        .platform
        .list_jobs(&JobFilter {
            model_id: Some(model.id.clone()),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
}

#[tokio::test]
async fn scenario_d_malformed_proof_hash_fails_verification() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("sentiment", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");
    let job = world
        .platform
        .run_job(&model.id, &owner.id, json!({"text": "fine"}))
        .await
        .expect("run");

    // Corrupt the stored proof hash to a wrong-length value
    let proofs = ProofRepository::new(Arc::clone(&world.store));
    let mut proof = proofs
        .get_by_job(&job.id)
        .await
        .expect("get")
        .expect("exists");
    proof.proof_hash = "deadbeef".to_string();
    proofs.save(&proof).await.expect("save");

    let verified = world.platform.verify_job(&job.id).await.expect("verify");
    assert_eq!(verified.status, JobStatus::Failed);
    assert_eq!(verified.verification_status.as_deref(), Some("failed"));

    let proof = proofs
        .get_by_job(&job.id)
        .await
        .expect("get")
        .expect("exists");
    assert!(!proof.is_valid);
    assert!(proof.verified_at.is_some());
}

#[tokio::test]
async fn attested_run_verifies_end_to_end() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("sentiment", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");

    let job = world
        .platform
        .run_job(&model.id, &owner.id, json!({"text": "excellent"}))
        .await
        .expect("run");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.proof_hash.is_some());
    assert!(job.tx_hash.is_some());

    let verified = world.platform.verify_job(&job.id).await.expect("verify");
    assert_eq!(verified.status, JobStatus::Verified);
    assert_eq!(verified.verification_status.as_deref(), Some("verified"));
}

#[tokio::test]
async fn escrow_settlement_moves_funds_exactly_once() {
    let world = world();
    let (seller, listing_id) = seller_with_listing(&world, 2.0).await;
    let buyer = world
        .platform
        .get_or_create_user("0xbuyer")
        .await
        .expect("buyer");
    let purchase = world
        .platform
        .purchase(&buyer.id, &listing_id, 3)
        .await
        .expect("purchase");

    let settled = world
        .platform
        .release_escrow(&purchase.id)
        .await
        .expect("release");
    assert_eq!(settled.escrow_status, EscrowStatus::Released);

    let seller = world.platform.get_user(&seller.id).await.expect("get");
    assert!((seller.balance.as_credits() - 1006.0).abs() < f64::EPSILON);

    // Settling again neither changes status nor double-credits
    let err = world
        .platform
        .refund_escrow(&purchase.id)
        .await
        .expect_err("already settled");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let seller = world.platform.get_user(&seller.id).await.expect("get");
    assert!((seller.balance.as_credits() - 1006.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn insufficient_balance_rejects_purchase() {
    let world = world();
    let (_, listing_id) = seller_with_listing(&world, 2.0).await;
    let buyer = world
        .platform
        .get_or_create_user("0xbuyer")
        .await
        .expect("buyer");

    let err = world
        .platform
        .purchase(&buyer.id, &listing_id, 1000)
        .await
        .expect_err("2000 credits exceed the starting balance");
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
}

#[tokio::test]
async fn dashboard_collects_user_activity() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("sentiment", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");
    let listing = world
        .platform
        .create_listing(&model.id, "svc", Credits::credits(1.0), None, vec![])
        .await
        .expect("listing");
    world
        .platform
        .purchase(&owner.id, &listing.id, 2)
        .await
        .expect("purchase");
    for text in ["a", "b"] {
        world
            .platform
            .run_job(&model.id, &owner.id, json!({"text": text}))
            .await
            .expect("run");
    }

    let dashboard = world.platform.dashboard(&owner.id).await.expect("dashboard");
    assert_eq!(dashboard.user.id, owner.id);
    assert_eq!(dashboard.models.len(), 1);
    assert_eq!(dashboard.recent_jobs.len(), 2);
    // Newest first
    assert_eq!(dashboard.recent_jobs[0].input_data, json!({"text": "b"}));
    assert_eq!(dashboard.purchases.len(), 1);
}

#[tokio::test]
async fn stats_count_models_jobs_and_listings() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("sentiment", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");
    world
        .platform
        .create_listing(&model.id, "svc", Credits::credits(1.0), None, vec![])
        .await
        .expect("listing");

    let job = world
        .platform
        .run_job(&model.id, &owner.id, json!({"text": "x"}))
        .await
        .expect("run");
    world.platform.verify_job(&job.id).await.expect("verify");
    world
        .platform
        .run_job(&model.id, &owner.id, json!({"text": "y"}))
        .await
        .expect("run");

    let stats = world.platform.stats().await.expect("stats");
    assert_eq!(stats.total_models, 1);
    assert_eq!(stats.total_inferences, 2);
    assert_eq!(stats.completed_inferences, 1);
    // The verified job plus the completed one carrying a proof
    assert_eq!(stats.verified_inferences, 2);
    assert_eq!(stats.active_listings, 1);
    assert!((stats.verification_rate - 200.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn repeated_reads_are_bit_identical() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let model = world
        .platform
        .create_model("sentiment", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");
    let job = world
        .platform
        .run_job(&model.id, &owner.id, json!({"text": "x"}))
        .await
        .expect("run");

    let a = world.platform.get_job(&job.id).await.expect("get");
    let b = world.platform.get_job(&job.id).await.expect("get");
    assert_eq!(
        serde_json::to_string(&a).expect("json"),
        serde_json::to_string(&b).expect("json")
    );
}

#[tokio::test]
async fn deleted_model_disappears_from_lists() {
    let world = world();
    let owner = world
        .platform
        .get_or_create_user("0xowner")
        .await
        .expect("owner");
    let keep = world
        .platform
        .create_model("keep", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");
    let drop = world
        .platform
        .create_model("drop", None, ModelType::Custom, true, &owner.id, json!({}))
        .await
        .expect("model");

    world.platform.delete_model(&drop.id).await.expect("delete");

    let all = world.platform.list_models(None).await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, keep.id);

    let owned = world
        .platform
        .list_models(Some(&owner.id))
        .await
        .expect("list");
    assert_eq!(owned.len(), 1);

    let err = world.platform.get_model(&drop.id).await.expect_err("gone");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
