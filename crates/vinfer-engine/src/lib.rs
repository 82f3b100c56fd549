//! # vinfer-engine
//!
//! Inference execution for the V-Inference coordinator.
//!
//! This crate provides:
//!
//! - Runner classification ([`RunnerKind`]) over model type, file extension,
//!   and input shape
//! - The [`InferenceRunner`] and [`AttestationService`] capability traits,
//!   with built-in simulated implementations ([`SimulatedRunner`],
//!   [`HashAttestor`])
//! - The [`JobOrchestrator`] driving the job status machine end to end

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attestation;
pub mod error;
pub mod orchestrator;
pub mod runner;

pub use attestation::{AnchorReceipt, AttestationService, HashAttestor, ProofBundle, VerifyOutcome};
pub use error::{EngineError, EngineResult};
pub use orchestrator::JobOrchestrator;
pub use runner::{InferenceOutcome, InferenceRunner, RunnerKind, SimulatedRunner};
