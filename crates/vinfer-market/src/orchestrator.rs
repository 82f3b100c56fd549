//! The marketplace orchestrator.
//!
//! Composes the job orchestrator with the escrow ledger: listing creation,
//! purchase with funds locked in escrow, per-credit inference consumption,
//! and escrow settlement.

use serde_json::Value;
use tracing::info;
use vinfer_core::{CoreError, Credits, InferenceJob, MarketplaceListing, Purchase};
use vinfer_engine::JobOrchestrator;
use vinfer_store::{ListingRepository, ModelRepository, PurchaseRepository};

use crate::error::{MarketError, MarketResult};
use crate::escrow::EscrowLedger;

/// Filter for browsing active listings.
#[derive(Debug, Default, Clone)]
pub struct ListingFilter {
    /// Restrict to one category.
    pub category: Option<String>,
    /// Minimum unit price, inclusive.
    pub min_price: Option<Credits>,
    /// Maximum unit price, inclusive.
    pub max_price: Option<Credits>,
}

impl ListingFilter {
    fn matches(&self, listing: &MarketplaceListing) -> bool {
        if let Some(category) = &self.category {
            if &listing.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price_per_inference < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price_per_inference > max {
                return false;
            }
        }
        true
    }
}

/// Drives listing, purchase, and credit consumption flows.
#[derive(Clone)]
pub struct MarketplaceOrchestrator {
    listings: ListingRepository,
    purchases: PurchaseRepository,
    models: ModelRepository,
    ledger: EscrowLedger,
    jobs: JobOrchestrator,
}

impl MarketplaceOrchestrator {
    /// Create an orchestrator over the given repositories and
    /// collaborators.
    #[must_use]
    pub fn new(
        listings: ListingRepository,
        purchases: PurchaseRepository,
        models: ModelRepository,
        ledger: EscrowLedger,
        jobs: JobOrchestrator,
    ) -> Self {
        Self {
            listings,
            purchases,
            models,
            ledger,
            jobs,
        }
    }

    /// List a model on the marketplace.
    ///
    /// The owner and display name are taken from the model record. A new
    /// listing for a model replaces the previous one in the model mapping.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the model does not resolve.
    pub async fn create_listing(
        &self,
        model_id: &str,
        description: &str,
        price_per_inference: Credits,
        category: Option<String>,
        tags: Vec<String>,
    ) -> MarketResult<MarketplaceListing> {
        let model = self
            .models
            .get(model_id)
            .await?
            .ok_or_else(|| MarketError::NotFound {
                entity: "model",
                id: model_id.to_string(),
            })?;
        let listing = MarketplaceListing::new(
            model_id,
            &model.owner_id,
            &model.name,
            description,
            price_per_inference,
            category,
            tags,
        );
        self.listings.create(&listing).await?;
        Ok(listing)
    }

    /// Buy inference credits against a listing, locking the total cost in
    /// escrow.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the listing does not resolve,
    /// [`MarketError::InvalidInput`] for a zero credit count, or
    /// [`MarketError::InsufficientBalance`] if the buyer cannot cover the
    /// total.
    pub async fn purchase(
        &self,
        user_id: &str,
        listing_id: &str,
        inferences_count: u64,
    ) -> MarketResult<Purchase> {
        let listing = self.resolve_listing(listing_id).await?;
        if inferences_count == 0 {
            return Err(MarketError::invalid_input(
                "inferences_count must be at least 1",
            ));
        }
        let total_cost = listing.price_per_inference.saturating_mul(inferences_count);

        let purchase = Purchase::new(
            user_id,
            listing_id,
            &listing.model_id,
            inferences_count,
            total_cost,
        );
        self.purchases.create(&purchase).await?;
        self.ledger.lock(&purchase.id, user_id, total_cost).await?;
        Ok(purchase)
    }

    /// Consume one credit from a purchase by running an attested inference
    /// against the purchased model.
    ///
    /// The credit is only decremented after the run completes, and the
    /// listing's usage rollups are folded in at the unit price the buyer
    /// paid, so later price changes do not skew recorded revenue.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the purchase does not resolve,
    /// [`CoreError::CreditsExhausted`] if none remain, or the engine error
    /// from a failed run.
    pub async fn use_credit(
        &self,
        purchase_id: &str,
        input_data: Value,
    ) -> MarketResult<(InferenceJob, Purchase)> {
        let mut purchase = self.resolve_purchase(purchase_id).await?;
        if !purchase.has_credits() {
            return Err(CoreError::CreditsExhausted {
                purchase_id: purchase.id,
            }
            .into());
        }

        let job = self
            .jobs
            .run(&purchase.model_id, &purchase.user_id, input_data, true)
            .await?;

        purchase.consume_credit()?;
        self.purchases.save(&purchase).await?;

        if let Some(mut listing) = self.listings.get(&purchase.listing_id).await? {
            // Purchase-time unit price, not the listing's current one.
            let unit_price = Credits::from_base_units(
                purchase.total_paid.base_units() / purchase.inferences_bought.max(1),
            );
            listing.record_sale(unit_price);
            self.listings.save(&listing).await?;
        }

        info!(
            purchase_id = %purchase.id,
            job_id = %job.id,
            remaining = purchase.inferences_remaining,
            "credit consumed"
        );
        Ok((job, purchase))
    }

    /// Release a purchase's escrowed funds to the listing owner.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the purchase or its listing
    /// does not resolve, or an invalid-transition error if the escrow has
    /// already settled.
    pub async fn release(&self, purchase_id: &str) -> MarketResult<Purchase> {
        let mut purchase = self.resolve_purchase(purchase_id).await?;
        let listing = self.resolve_listing(&purchase.listing_id).await?;
        self.ledger.release(&mut purchase, &listing.owner_id).await?;
        Ok(purchase)
    }

    /// Refund a purchase's escrowed funds to the buyer.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the purchase does not resolve,
    /// or an invalid-transition error if the escrow has already settled.
    pub async fn refund(&self, purchase_id: &str) -> MarketResult<Purchase> {
        let mut purchase = self.resolve_purchase(purchase_id).await?;
        self.ledger.refund(&mut purchase).await?;
        Ok(purchase)
    }

    /// Fetch a purchase by id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the purchase does not resolve.
    pub async fn get_purchase(&self, purchase_id: &str) -> MarketResult<Purchase> {
        self.resolve_purchase(purchase_id).await
    }

    /// All purchases made by a user.
    pub async fn list_purchases(&self, user_id: &str) -> MarketResult<Vec<Purchase>> {
        Ok(self.purchases.list_by_user(user_id).await?)
    }

    /// Active listings matching the filter, in creation order.
    pub async fn list_listings(
        &self,
        filter: &ListingFilter,
    ) -> MarketResult<Vec<MarketplaceListing>> {
        let listings = self.listings.list_active().await?;
        Ok(listings.into_iter().filter(|l| filter.matches(l)).collect())
    }

    async fn resolve_listing(&self, listing_id: &str) -> MarketResult<MarketplaceListing> {
        self.listings
            .get(listing_id)
            .await?
            .ok_or_else(|| MarketError::NotFound {
                entity: "listing",
                id: listing_id.to_string(),
            })
    }

    async fn resolve_purchase(&self, purchase_id: &str) -> MarketResult<Purchase> {
        self.purchases
            .get(purchase_id)
            .await?
            .ok_or_else(|| MarketError::NotFound {
                entity: "purchase",
                id: purchase_id.to_string(),
            })
    }
}
