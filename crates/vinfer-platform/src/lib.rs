//! # vinfer-platform
//!
//! The facade crate for the V-Inference coordinator: wires the store,
//! engine, and marketplace into one [`Platform`] service for a route layer
//! to call, plus configuration, logging setup, platform stats, and the
//! user dashboard.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use config::PlatformConfig;
pub use error::{ErrorKind, PlatformError, PlatformResult};
pub use service::{Dashboard, JobFilter, Platform, PlatformStats};
pub use telemetry::init_tracing;
