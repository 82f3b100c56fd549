//! Marketplace listings, purchases, and the escrow status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::credits::Credits;
use crate::error::CoreError;
use crate::id::entity_id;

/// Escrow custody state of a purchase.
///
/// Transitions are monotonic: `locked -> released` or `locked -> refunded`,
/// never both and never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Buyer funds are held pending delivery.
    Locked,
    /// Funds were paid out to the seller.
    Released,
    /// Funds were returned to the buyer.
    Refunded,
}

impl EscrowStatus {
    /// Checks if a transition to the target status is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use EscrowStatus::{Locked, Refunded, Released};

        matches!((self, target), (Locked, Released | Refunded))
    }

    /// Returns true if the escrow has settled.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Released | Self::Refunded)
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Released => write!(f, "released"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// A marketplace listing offering paid inference against a model.
///
/// At most one active listing exists per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceListing {
    /// Unique listing id.
    pub id: String,
    /// The model being offered.
    pub model_id: String,
    /// Selling user.
    pub owner_id: String,
    /// Denormalized model name for display.
    pub model_name: String,
    /// Listing description.
    pub description: String,
    /// Price charged per inference credit.
    pub price_per_inference: Credits,
    /// Whether the listing is purchasable.
    pub is_active: bool,
    /// Inference runs consumed through this listing.
    pub total_inferences: u64,
    /// Gross revenue accumulated through this listing.
    pub total_revenue: Credits,
    /// Listing rating.
    pub rating: f64,
    /// Category label.
    pub category: String,
    /// Search tags.
    pub tags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MarketplaceListing {
    /// Default rating for new listings.
    pub const DEFAULT_RATING: f64 = 5.0;

    /// Create a new active listing.
    #[must_use]
    pub fn new(
        model_id: impl Into<String>,
        owner_id: impl Into<String>,
        model_name: impl Into<String>,
        description: impl Into<String>,
        price_per_inference: Credits,
        category: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: entity_id("listing"),
            model_id: model_id.into(),
            owner_id: owner_id.into(),
            model_name: model_name.into(),
            description: description.into(),
            price_per_inference,
            is_active: true,
            total_inferences: 0,
            total_revenue: Credits::ZERO,
            rating: Self::DEFAULT_RATING,
            category: category.unwrap_or_else(|| "general".to_string()),
            tags,
            created_at: Utc::now(),
        }
    }

    /// Fold one consumed inference into the revenue rollups.
    pub fn record_sale(&mut self, unit_price: Credits) {
        self.total_inferences += 1;
        self.total_revenue = self.total_revenue.saturating_add(unit_price);
    }
}

/// A purchase of inference credits against a listing, with funds in escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique purchase id.
    pub id: String,
    /// Buying user.
    pub user_id: String,
    /// The listing purchased from.
    pub listing_id: String,
    /// Denormalized model id for dispatching runs.
    pub model_id: String,
    /// Credits bought.
    pub inferences_bought: u64,
    /// Credits not yet consumed.
    pub inferences_remaining: u64,
    /// Total escrowed at purchase time.
    pub total_paid: Credits,
    /// Escrow custody state.
    pub escrow_status: EscrowStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Create a new purchase with all credits remaining and funds locked.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        listing_id: impl Into<String>,
        model_id: impl Into<String>,
        inferences_bought: u64,
        total_paid: Credits,
    ) -> Self {
        Self {
            id: entity_id("purchase"),
            user_id: user_id.into(),
            listing_id: listing_id.into(),
            model_id: model_id.into(),
            inferences_bought,
            inferences_remaining: inferences_bought,
            total_paid,
            escrow_status: EscrowStatus::Locked,
            created_at: Utc::now(),
        }
    }

    /// Returns true if at least one credit remains.
    #[must_use]
    pub const fn has_credits(&self) -> bool {
        self.inferences_remaining > 0
    }

    /// Consume exactly one credit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CreditsExhausted`] if no credits remain; the
    /// count never goes below zero.
    pub fn consume_credit(&mut self) -> Result<(), CoreError> {
        if self.inferences_remaining == 0 {
            return Err(CoreError::CreditsExhausted {
                purchase_id: self.id.clone(),
            });
        }
        self.inferences_remaining -= 1;
        Ok(())
    }

    /// Attempt an escrow status transition.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] unless the escrow is
    /// currently locked.
    pub fn settle_escrow(&mut self, target: EscrowStatus) -> Result<(), CoreError> {
        if self.escrow_status.can_transition_to(&target) {
            self.escrow_status = target;
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: "purchase",
                from: self.escrow_status.to_string(),
                to: target.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_purchase(count: u64) -> Purchase {
        Purchase::new("user-1", "listing-1", "model-1", count, Credits::credits(6.0))
    }

    #[test]
    fn escrow_transitions() {
        assert!(EscrowStatus::Locked.can_transition_to(&EscrowStatus::Released));
        assert!(EscrowStatus::Locked.can_transition_to(&EscrowStatus::Refunded));
        assert!(!EscrowStatus::Released.can_transition_to(&EscrowStatus::Refunded));
        assert!(!EscrowStatus::Refunded.can_transition_to(&EscrowStatus::Released));
        assert!(!EscrowStatus::Released.can_transition_to(&EscrowStatus::Locked));
    }

    #[test]
    fn new_listing_defaults() {
        let listing = MarketplaceListing::new(
            "model-1",
            "user-1",
            "mnist",
            "digit recognizer",
            Credits::credits(2.0),
            None,
            vec![],
        );
        assert!(listing.is_active);
        assert_eq!(listing.category, "general");
        assert!((listing.rating - 5.0).abs() < f64::EPSILON);
        assert_eq!(listing.total_revenue, Credits::ZERO);
    }

    #[test]
    fn record_sale_accumulates() {
        let mut listing = MarketplaceListing::new(
            "model-1",
            "user-1",
            "mnist",
            "",
            Credits::credits(2.0),
            None,
            vec![],
        );
        listing.record_sale(Credits::credits(2.0));
        listing.record_sale(Credits::credits(2.0));
        assert_eq!(listing.total_inferences, 2);
        assert_eq!(listing.total_revenue, Credits::credits(4.0));
    }

    #[test]
    fn new_purchase_is_locked_with_full_credits() {
        let purchase = test_purchase(3);
        assert_eq!(purchase.escrow_status, EscrowStatus::Locked);
        assert_eq!(purchase.inferences_remaining, 3);
        assert_eq!(purchase.inferences_bought, 3);
    }

    #[test]
    fn consume_credit_decrements_to_zero_then_fails() {
        let mut purchase = test_purchase(1);
        purchase.consume_credit().expect("one credit available");
        assert_eq!(purchase.inferences_remaining, 0);

        let err = purchase.consume_credit();
        assert!(matches!(err, Err(CoreError::CreditsExhausted { .. })));
        assert_eq!(purchase.inferences_remaining, 0);
    }

    #[test]
    fn settle_escrow_once_only() {
        let mut purchase = test_purchase(1);
        purchase.settle_escrow(EscrowStatus::Released).expect("locked -> released");

        let err = purchase.settle_escrow(EscrowStatus::Refunded);
        assert!(matches!(err, Err(CoreError::InvalidTransition { .. })));
        assert_eq!(purchase.escrow_status, EscrowStatus::Released);
    }

    #[test]
    fn remaining_bounded_by_bought() {
        let mut purchase = test_purchase(2);
        while purchase.has_credits() {
            purchase.consume_credit().expect("credits remain");
            assert!(purchase.inferences_remaining <= purchase.inferences_bought);
        }
    }

    #[test]
    fn purchase_serialization_round_trip() {
        let purchase = test_purchase(3);
        let json = serde_json::to_string(&purchase).expect("serialize");
        let parsed: Purchase = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.id, purchase.id);
        assert_eq!(parsed.escrow_status, EscrowStatus::Locked);
        assert_eq!(parsed.total_paid, purchase.total_paid);
    }
}
