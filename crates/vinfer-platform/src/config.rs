//! Platform configuration.

use vinfer_core::Credits;

/// Demo balance granted to newly created users, in credits.
pub const DEFAULT_STARTING_BALANCE: f64 = 1000.0;

/// Jobs shown on a user dashboard.
pub const DEFAULT_RECENT_JOBS: usize = 10;

/// Tunables for the platform service.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Balance granted to newly created users.
    pub starting_balance: Credits,
    /// Whether inference runs generate and anchor proofs.
    pub use_attestation: bool,
    /// Maximum recent jobs returned by the dashboard.
    pub dashboard_recent_jobs: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            starting_balance: Credits::credits(DEFAULT_STARTING_BALANCE),
            use_attestation: true,
            dashboard_recent_jobs: DEFAULT_RECENT_JOBS,
        }
    }
}

impl PlatformConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `VINFER_STARTING_BALANCE` (decimal credits),
    /// `VINFER_USE_ATTESTATION` (`true`/`false`),
    /// `VINFER_DASHBOARD_RECENT_JOBS`. Unset or unparsable values keep the
    /// default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(balance) = read_env("VINFER_STARTING_BALANCE")
            .and_then(|raw| raw.parse::<f64>().ok())
            .and_then(|value| Credits::try_credits(value).ok())
        {
            config.starting_balance = balance;
        }
        if let Some(flag) = read_env("VINFER_USE_ATTESTATION").and_then(|raw| raw.parse().ok()) {
            config.use_attestation = flag;
        }
        if let Some(limit) =
            read_env("VINFER_DASHBOARD_RECENT_JOBS").and_then(|raw| raw.parse().ok())
        {
            config.dashboard_recent_jobs = limit;
        }
        config
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
