//! Purchase repository.

use std::sync::Arc;

use tracing::info;
use vinfer_core::Purchase;

use crate::error::StoreResult;
use crate::index::{append_to_index, fetch_many, read_id_list, read_record, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// CRUD and index maintenance for [`Purchase`] records.
///
/// Purchases are indexed per buyer (`purchases:user:<id>`) and per listing
/// (`purchases:listing:<id>`).
#[derive(Clone)]
pub struct PurchaseRepository {
    store: Arc<dyn KeyValueStore>,
}

impl PurchaseRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a new purchase and append it to the buyer and listing
    /// indices.
    pub async fn create(&self, purchase: &Purchase) -> StoreResult<()> {
        write_record(&*self.store, &keys::purchase(&purchase.id), purchase).await?;
        append_to_index(
            &*self.store,
            &keys::purchases_by_user(&purchase.user_id),
            &purchase.id,
        )
        .await?;
        append_to_index(
            &*self.store,
            &keys::purchases_by_listing(&purchase.listing_id),
            &purchase.id,
        )
        .await?;
        info!(
            purchase_id = %purchase.id,
            listing_id = %purchase.listing_id,
            inferences = purchase.inferences_bought,
            total_paid = %purchase.total_paid,
            "purchase recorded"
        );
        Ok(())
    }

    /// Fetch a purchase by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Purchase>> {
        read_record(&*self.store, &keys::purchase(id)).await
    }

    /// Overwrite a purchase's primary record.
    pub async fn save(&self, purchase: &Purchase) -> StoreResult<()> {
        write_record(&*self.store, &keys::purchase(&purchase.id), purchase).await
    }

    /// All purchases made by a user, in creation order.
    pub async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Purchase>> {
        let ids = read_id_list(&*self.store, &keys::purchases_by_user(user_id)).await?;
        fetch_many(&*self.store, &ids, keys::purchase).await
    }

    /// All purchases against a listing, in creation order.
    pub async fn list_by_listing(&self, listing_id: &str) -> StoreResult<Vec<Purchase>> {
        let ids = read_id_list(&*self.store, &keys::purchases_by_listing(listing_id)).await?;
        fetch_many(&*self.store, &ids, keys::purchase).await
    }

    /// The most recent purchase with credits remaining that a user holds
    /// against a listing.
    pub async fn find_usable(
        &self,
        user_id: &str,
        listing_id: &str,
    ) -> StoreResult<Option<Purchase>> {
        let purchases = self.list_by_user(user_id).await?;
        Ok(purchases
            .into_iter()
            .rev()
            .find(|p| p.listing_id == listing_id && p.has_credits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use vinfer_core::Credits;

    fn repo() -> PurchaseRepository {
        PurchaseRepository::new(MemoryStore::shared())
    }

    fn test_purchase(user: &str, listing: &str, count: u64) -> Purchase {
        Purchase::new(user, listing, "model-1", count, Credits::credits(6.0))
    }

    #[tokio::test]
    async fn create_appears_in_both_indices() {
        let purchases = repo();
        let purchase = test_purchase("user-1", "listing-1", 3);
        purchases.create(&purchase).await.expect("create");

        assert_eq!(purchases.list_by_user("user-1").await.expect("list").len(), 1);
        assert_eq!(
            purchases.list_by_listing("listing-1").await.expect("list").len(),
            1
        );
    }

    #[tokio::test]
    async fn find_usable_skips_exhausted() {
        let purchases = repo();
        let mut spent = test_purchase("user-1", "listing-1", 1);
        spent.consume_credit().expect("credit");
        purchases.create(&spent).await.expect("create");

        assert!(purchases
            .find_usable("user-1", "listing-1")
            .await
            .expect("find")
            .is_none());

        let fresh = test_purchase("user-1", "listing-1", 2);
        purchases.create(&fresh).await.expect("create");

        let found = purchases
            .find_usable("user-1", "listing-1")
            .await
            .expect("find")
            .expect("usable");
        assert_eq!(found.id, fresh.id);
    }

    #[tokio::test]
    async fn find_usable_is_scoped_to_listing() {
        let purchases = repo();
        let purchase = test_purchase("user-1", "listing-1", 2);
        purchases.create(&purchase).await.expect("create");

        assert!(purchases
            .find_usable("user-1", "listing-2")
            .await
            .expect("find")
            .is_none());
        assert!(purchases
            .find_usable("user-2", "listing-1")
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn save_persists_decrement() {
        let purchases = repo();
        let mut purchase = test_purchase("user-1", "listing-1", 2);
        purchases.create(&purchase).await.expect("create");

        purchase.consume_credit().expect("credit");
        purchases.save(&purchase).await.expect("save");

        let fetched = purchases
            .get(&purchase.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(fetched.inferences_remaining, 1);
    }
}
