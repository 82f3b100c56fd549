//! Shared primitives for primary records and index lists.
//!
//! Index appends and removals are read-modify-write cycles on a JSON array
//! of ids. Two concurrent writers on the same list can lose an append; the
//! lenient fan-out in [`fetch_many`] is the safety net on the read side.

use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Read and decode the record at `key`, if present.
pub(crate) async fn read_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and write `record` at `key`, overwriting any existing value.
pub(crate) async fn write_record<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    record: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(record)?;
    store.set(key, &raw).await
}

/// Read the id list at `key`; an absent key is an empty list.
pub(crate) async fn read_id_list(store: &dyn KeyValueStore, key: &str) -> StoreResult<Vec<String>> {
    match read_record::<Vec<String>>(store, key).await? {
        Some(ids) => Ok(ids),
        None => Ok(Vec::new()),
    }
}

/// Append `id` to the ordered list at `key` (read-append-write).
pub(crate) async fn append_to_index(
    store: &dyn KeyValueStore,
    key: &str,
    id: &str,
) -> StoreResult<()> {
    let mut ids = read_id_list(store, key).await?;
    ids.push(id.to_string());
    write_record(store, key, &ids).await
}

/// Remove every occurrence of `id` from the list at `key`.
pub(crate) async fn remove_from_index(
    store: &dyn KeyValueStore,
    key: &str,
    id: &str,
) -> StoreResult<()> {
    let mut ids = read_id_list(store, key).await?;
    ids.retain(|existing| existing != id);
    write_record(store, key, &ids).await
}

/// Resolve `ids` to records in parallel, dropping ids whose primary record
/// is missing.
pub(crate) async fn fetch_many<T, F>(
    store: &dyn KeyValueStore,
    ids: &[String],
    key_of: F,
) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(&str) -> String,
{
    let fetches = ids.iter().map(|id| {
        let key = key_of(id);
        async move { read_record::<T>(store, &key).await }
    });

    let mut records = Vec::with_capacity(ids.len());
    for fetched in join_all(fetches).await {
        if let Some(record) = fetched? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[tokio::test]
    async fn append_and_remove_preserve_order() {
        let store = MemoryStore::new();
        append_to_index(&store, "list", "a").await.expect("append");
        append_to_index(&store, "list", "b").await.expect("append");
        append_to_index(&store, "list", "c").await.expect("append");

        let ids = read_id_list(&store, "list").await.expect("read");
        assert_eq!(ids, vec!["a", "b", "c"]);

        remove_from_index(&store, "list", "b").await.expect("remove");
        let ids = read_id_list(&store, "list").await.expect("read");
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn fetch_many_drops_dangling_ids() {
        let store = MemoryStore::new();
        write_record(&store, "item:a", &1u32).await.expect("write");
        write_record(&store, "item:c", &3u32).await.expect("write");

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let values: Vec<u32> = fetch_many(&store, &ids, |id| format!("item:{id}"))
            .await
            .expect("fetch");
        assert_eq!(values, vec![1, 3]);
    }

    #[tokio::test]
    async fn corrupt_record_is_surfaced() {
        let store = MemoryStore::new();
        store.set("item:a", "not json").await.expect("set");
        let result = read_record::<u32>(&store, "item:a").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
