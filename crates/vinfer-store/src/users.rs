//! User repository.

use std::sync::Arc;

use tracing::debug;
use vinfer_core::{Credits, User};

use crate::error::StoreResult;
use crate::index::{read_record, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// CRUD and wallet lookup for [`User`] records.
///
/// The wallet index (`users:wallet:<addr>`) stores the bare user id, not
/// JSON, matching the persisted layout.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
}

impl UserRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create and persist a new user, registering the wallet mapping.
    pub async fn create(
        &self,
        wallet_address: &str,
        username: Option<String>,
        starting_balance: Credits,
    ) -> StoreResult<User> {
        let user = User::new(wallet_address, username, starting_balance);
        write_record(&*self.store, &keys::user(&user.id), &user).await?;
        self.store
            .set(&keys::user_by_wallet(wallet_address), &user.id)
            .await?;
        debug!(user_id = %user.id, wallet = %wallet_address, "user created");
        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<User>> {
        read_record(&*self.store, &keys::user(id)).await
    }

    /// Fetch a user by wallet address.
    pub async fn get_by_wallet(&self, wallet_address: &str) -> StoreResult<Option<User>> {
        match self.store.get(&keys::user_by_wallet(wallet_address)).await? {
            Some(id) => self.get(&id).await,
            None => Ok(None),
        }
    }

    /// Overwrite a user's primary record.
    pub async fn save(&self, user: &User) -> StoreResult<()> {
        write_record(&*self.store, &keys::user(&user.id), user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn repo() -> UserRepository {
        UserRepository::new(MemoryStore::shared())
    }

    #[tokio::test]
    async fn create_and_get() {
        let users = repo();
        let user = users
            .create("0xabc", Some("alice".to_string()), Credits::credits(1000.0))
            .await
            .expect("create");

        let fetched = users.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(fetched.wallet_address, "0xabc");
        assert_eq!(fetched.balance, Credits::credits(1000.0));
    }

    #[tokio::test]
    async fn lookup_by_wallet() {
        let users = repo();
        let user = users
            .create("0xdef", None, Credits::ZERO)
            .await
            .expect("create");

        let fetched = users
            .get_by_wallet("0xdef")
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(fetched.id, user.id);

        assert!(users.get_by_wallet("0xmissing").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn save_overwrites_balance() {
        let users = repo();
        let mut user = users
            .create("0xabc", None, Credits::credits(10.0))
            .await
            .expect("create");

        user.balance = Credits::credits(4.0);
        users.save(&user).await.expect("save");

        let fetched = users.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(fetched.balance, Credits::credits(4.0));
    }

    #[tokio::test]
    async fn repeated_get_is_stable() {
        let users = repo();
        let user = users
            .create("0xabc", None, Credits::credits(1.0))
            .await
            .expect("create");

        let a = users.get(&user.id).await.expect("get").expect("exists");
        let b = users.get(&user.id).await.expect("get").expect("exists");
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json")
        );
    }
}
