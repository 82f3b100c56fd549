//! The escrow ledger.
//!
//! The only component that mutates user balances. Lock debits the buyer
//! while a purchase's funds are held; release pays the seller and refund
//! returns the buyer's funds, each guarded by the purchase's escrow status
//! so a settled purchase can never be credited twice.

use tracing::info;
use vinfer_core::{Credits, EscrowStatus, Purchase, User};

use crate::error::{MarketError, MarketResult};
use vinfer_store::{PurchaseRepository, UserRepository};

/// Debits and credits user balances around purchase escrow transitions.
#[derive(Clone)]
pub struct EscrowLedger {
    users: UserRepository,
    purchases: PurchaseRepository,
}

impl EscrowLedger {
    /// Create a ledger over the given repositories.
    #[must_use]
    pub fn new(users: UserRepository, purchases: PurchaseRepository) -> Self {
        Self { users, purchases }
    }

    /// Debit `amount` from the buyer for a locked purchase.
    ///
    /// The purchase record is already `locked` when this runs; the balance
    /// debit is the only side effect here.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientBalance`] if the buyer cannot
    /// cover the amount; no balance is mutated in that case.
    pub async fn lock(
        &self,
        purchase_id: &str,
        user_id: &str,
        amount: Credits,
    ) -> MarketResult<User> {
        let mut buyer = self.resolve_user(user_id).await?;
        let remaining = buyer
            .balance
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientBalance {
                have: buyer.balance,
                need: amount,
            })?;
        buyer.balance = remaining;
        self.users.save(&buyer).await?;
        info!(purchase_id = %purchase_id, user_id = %user_id, amount = %amount, "escrow locked");
        Ok(buyer)
    }

    /// Release a locked purchase's funds to the seller.
    ///
    /// # Errors
    ///
    /// Returns [`vinfer_core::CoreError::InvalidTransition`] unless the
    /// escrow is currently locked, so a second settlement cannot
    /// double-credit.
    pub async fn release(&self, purchase: &mut Purchase, seller_id: &str) -> MarketResult<()> {
        purchase.settle_escrow(EscrowStatus::Released)?;
        let mut seller = self.resolve_user(seller_id).await?;
        seller.balance = seller.balance.saturating_add(purchase.total_paid);
        self.users.save(&seller).await?;
        self.purchases.save(purchase).await?;
        info!(
            purchase_id = %purchase.id,
            seller_id = %seller_id,
            amount = %purchase.total_paid,
            "escrow released"
        );
        Ok(())
    }

    /// Return a locked purchase's funds to the buyer.
    ///
    /// # Errors
    ///
    /// Returns [`vinfer_core::CoreError::InvalidTransition`] unless the
    /// escrow is currently locked.
    pub async fn refund(&self, purchase: &mut Purchase) -> MarketResult<()> {
        purchase.settle_escrow(EscrowStatus::Refunded)?;
        let mut buyer = self.resolve_user(&purchase.user_id).await?;
        buyer.balance = buyer.balance.saturating_add(purchase.total_paid);
        self.users.save(&buyer).await?;
        self.purchases.save(purchase).await?;
        info!(
            purchase_id = %purchase.id,
            user_id = %purchase.user_id,
            amount = %purchase.total_paid,
            "escrow refunded"
        );
        Ok(())
    }

    async fn resolve_user(&self, user_id: &str) -> MarketResult<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| MarketError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })
    }
}
