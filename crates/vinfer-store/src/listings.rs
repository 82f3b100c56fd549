//! Marketplace listing repository.

use std::sync::Arc;

use tracing::{debug, info};
use vinfer_core::{Credits, MarketplaceListing};

use crate::error::StoreResult;
use crate::index::{append_to_index, fetch_many, read_id_list, read_record, remove_from_index, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// Partial update for a listing record.
#[derive(Debug, Default, Clone)]
pub struct ListingUpdate {
    /// New description.
    pub description: Option<String>,
    /// New unit price.
    pub price_per_inference: Option<Credits>,
    /// Activation toggle.
    pub is_active: Option<bool>,
    /// New category label.
    pub category: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
}

/// CRUD and index maintenance for [`MarketplaceListing`] records.
///
/// Listings are indexed per owner (`listings:owner:<id>`) and, while
/// active, in the global `listings:active` list. The model mapping
/// (`listings:model:<id>`) stores the bare listing id and enforces at
/// most one listing per model at the lookup level.
#[derive(Clone)]
pub struct ListingRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ListingRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a new listing, registering the model mapping and appending
    /// to the owner and active indices.
    pub async fn create(&self, listing: &MarketplaceListing) -> StoreResult<()> {
        write_record(&*self.store, &keys::listing(&listing.id), listing).await?;
        self.store
            .set(&keys::listing_by_model(&listing.model_id), &listing.id)
            .await?;
        append_to_index(&*self.store, &keys::listings_by_owner(&listing.owner_id), &listing.id).await?;
        if listing.is_active {
            append_to_index(&*self.store, keys::ACTIVE_LISTINGS, &listing.id).await?;
        }
        info!(
            listing_id = %listing.id,
            model_id = %listing.model_id,
            price = %listing.price_per_inference,
            "listing created"
        );
        Ok(())
    }

    /// Fetch a listing by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<MarketplaceListing>> {
        read_record(&*self.store, &keys::listing(id)).await
    }

    /// Fetch the listing registered for a model, if any.
    pub async fn get_by_model(&self, model_id: &str) -> StoreResult<Option<MarketplaceListing>> {
        match self.store.get(&keys::listing_by_model(model_id)).await? {
            Some(id) => self.get(&id).await,
            None => Ok(None),
        }
    }

    /// Overwrite a listing's primary record without touching indices.
    ///
    /// Used for rollup updates that never change `is_active`.
    pub async fn save(&self, listing: &MarketplaceListing) -> StoreResult<()> {
        write_record(&*self.store, &keys::listing(&listing.id), listing).await
    }

    /// Merge a partial update onto a listing and persist it.
    ///
    /// Membership in the active index follows `is_active`: flipping it on
    /// appends, flipping it off removes. Returns `None` if the listing does
    /// not exist.
    pub async fn update(
        &self,
        id: &str,
        update: ListingUpdate,
    ) -> StoreResult<Option<MarketplaceListing>> {
        let Some(mut listing) = self.get(id).await? else {
            return Ok(None);
        };
        if let Some(description) = update.description {
            listing.description = description;
        }
        if let Some(price) = update.price_per_inference {
            listing.price_per_inference = price;
        }
        if let Some(category) = update.category {
            listing.category = category;
        }
        if let Some(tags) = update.tags {
            listing.tags = tags;
        }
        if let Some(is_active) = update.is_active {
            if is_active != listing.is_active {
                if is_active {
                    append_to_index(&*self.store, keys::ACTIVE_LISTINGS, id).await?;
                } else {
                    remove_from_index(&*self.store, keys::ACTIVE_LISTINGS, id).await?;
                }
                debug!(listing_id = %id, is_active, "listing activation changed");
            }
            listing.is_active = is_active;
        }
        self.save(&listing).await?;
        Ok(Some(listing))
    }

    /// All listings owned by a user, in creation order.
    pub async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<MarketplaceListing>> {
        let ids = read_id_list(&*self.store, &keys::listings_by_owner(owner_id)).await?;
        fetch_many(&*self.store, &ids, keys::listing).await
    }

    /// All currently active listings, in creation order.
    ///
    /// The primary record is authoritative: anything in the index whose
    /// record says inactive is filtered out.
    pub async fn list_active(&self) -> StoreResult<Vec<MarketplaceListing>> {
        let ids = read_id_list(&*self.store, keys::ACTIVE_LISTINGS).await?;
        let listings: Vec<MarketplaceListing> =
            fetch_many(&*self.store, &ids, keys::listing).await?;
        Ok(listings.into_iter().filter(|l| l.is_active).collect())
    }
}
