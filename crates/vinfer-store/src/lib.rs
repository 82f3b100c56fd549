//! # vinfer-store
//!
//! Persistence layer for the V-Inference coordinator.
//!
//! This crate provides:
//!
//! - The [`KeyValueStore`] capability trait and an in-memory backend
//! - The persisted key layout (`<entity>:<id>` primaries, `<entity>:<relation>:<id>`
//!   index lists, singleton keys for global indices)
//! - One repository per entity kind, maintaining secondary indices alongside
//!   the primary records
//!
//! Index maintenance is plain read-modify-write with no cross-key atomicity;
//! list fetches leniently drop ids whose primary record is missing. This is
//! the accepted consistency model for low write concurrency per key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod index;
pub mod jobs;
pub mod keys;
pub mod kv;
pub mod listings;
pub mod models;
pub mod proofs;
pub mod purchases;
pub mod users;

pub use error::{StoreError, StoreResult};
pub use jobs::{JobRepository, JobUpdate};
pub use kv::{KeyValueStore, MemoryStore};
pub use listings::{ListingRepository, ListingUpdate};
pub use models::{ModelRepository, ModelUpdate};
pub use proofs::ProofRepository;
pub use purchases::PurchaseRepository;
pub use users::UserRepository;
