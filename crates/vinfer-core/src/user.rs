//! User records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credits::Credits;
use crate::id::entity_id;

/// A platform user identified by a wallet address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user id.
    pub id: String,
    /// Wallet address (unique across users).
    pub wallet_address: String,
    /// Optional display name.
    pub username: Option<String>,
    /// Internal ledger balance. Mutated only by the escrow ledger.
    pub balance: Credits,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given starting balance.
    #[must_use]
    pub fn new(
        wallet_address: impl Into<String>,
        username: Option<String>,
        starting_balance: Credits,
    ) -> Self {
        Self {
            id: entity_id("user"),
            wallet_address: wallet_address.into(),
            username,
            balance: starting_balance,
            created_at: Utc::now(),
        }
    }
}
