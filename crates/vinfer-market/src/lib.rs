//! # vinfer-market
//!
//! Marketplace flows for the V-Inference coordinator.
//!
//! This crate provides:
//!
//! - The [`EscrowLedger`], the only component that mutates user balances,
//!   tied to purchase escrow transitions
//! - The [`MarketplaceOrchestrator`], composing the job orchestrator with
//!   the ledger for listing creation, purchase, and credit consumption

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod escrow;
pub mod orchestrator;

pub use error::{MarketError, MarketResult};
pub use escrow::EscrowLedger;
pub use orchestrator::{ListingFilter, MarketplaceOrchestrator};
