//! # vinfer-core
//!
//! Shared data model for the V-Inference coordination layer.
//!
//! This crate provides:
//!
//! - Entity records: users, models, inference jobs, listings, purchases, proofs
//! - Status machines with explicit transition predicates
//! - Fixed-point [`Credits`] amounts for balances and prices
//! - Prefixed unique identifiers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credits;
pub mod error;
pub mod id;
pub mod job;
pub mod market;
pub mod model;
pub mod proof;
pub mod user;

pub use credits::Credits;
pub use error::CoreError;
pub use id::entity_id;
pub use job::{InferenceJob, JobStatus};
pub use market::{EscrowStatus, MarketplaceListing, Purchase};
pub use model::{AiModel, ModelType};
pub use proof::ZkProof;
pub use user::User;
