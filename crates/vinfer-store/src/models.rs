//! Model repository.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use vinfer_core::{AiModel, ModelType};

use crate::error::StoreResult;
use crate::index::{append_to_index, fetch_many, read_id_list, read_record, remove_from_index, write_record};
use crate::keys;
use crate::kv::KeyValueStore;

/// Partial update for a model record.
#[derive(Debug, Default, Clone)]
pub struct ModelUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New visibility.
    pub is_public: Option<bool>,
    /// Path to the stored model binary (set on upload completion).
    pub file_path: Option<String>,
    /// Replacement metadata.
    pub metadata: Option<Value>,
}

/// CRUD and index maintenance for [`AiModel`] records.
///
/// Models are indexed per owner (`models:owner:<id>`) and globally
/// (`models:all`).
#[derive(Clone)]
pub struct ModelRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ModelRepository {
    /// Create a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create and persist a new model, appending it to the owner and global
    /// indices.
    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
        model_type: ModelType,
        is_public: bool,
        owner_id: &str,
        metadata: Value,
    ) -> StoreResult<AiModel> {
        let model = AiModel::new(name, description, model_type, is_public, owner_id, metadata);
        write_record(&*self.store, &keys::model(&model.id), &model).await?;
        append_to_index(&*self.store, &keys::models_by_owner(owner_id), &model.id).await?;
        append_to_index(&*self.store, keys::ALL_MODELS, &model.id).await?;
        info!(model_id = %model.id, owner_id = %owner_id, model_type = %model.model_type, "model registered");
        Ok(model)
    }

    /// Fetch a model by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<AiModel>> {
        read_record(&*self.store, &keys::model(id)).await
    }

    /// Merge a partial update onto a model and persist it.
    ///
    /// Returns `None` if the model does not exist.
    pub async fn update(&self, id: &str, update: ModelUpdate) -> StoreResult<Option<AiModel>> {
        let Some(mut model) = self.get(id).await? else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            model.name = name;
        }
        if let Some(description) = update.description {
            model.description = Some(description);
        }
        if let Some(is_public) = update.is_public {
            model.is_public = is_public;
        }
        if let Some(file_path) = update.file_path {
            model.file_path = Some(file_path);
        }
        if let Some(metadata) = update.metadata {
            model.metadata = metadata;
        }
        write_record(&*self.store, &keys::model(id), &model).await?;
        Ok(Some(model))
    }

    /// Fold one completed run into the model's usage counters.
    pub async fn record_inference(&self, id: &str, latency_ms: u64) -> StoreResult<()> {
        if let Some(mut model) = self.get(id).await? {
            model.record_inference(latency_ms);
            write_record(&*self.store, &keys::model(id), &model).await?;
        }
        Ok(())
    }

    /// Delete a model: primary record plus owner and global index membership.
    ///
    /// Returns false if the model did not exist.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let Some(model) = self.get(id).await? else {
            return Ok(false);
        };
        self.store.delete(&keys::model(id)).await?;
        remove_from_index(&*self.store, &keys::models_by_owner(&model.owner_id), id).await?;
        remove_from_index(&*self.store, keys::ALL_MODELS, id).await?;
        debug!(model_id = %id, "model deleted");
        Ok(true)
    }

    /// All models owned by a user, in creation order.
    pub async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<AiModel>> {
        let ids = read_id_list(&*self.store, &keys::models_by_owner(owner_id)).await?;
        fetch_many(&*self.store, &ids, keys::model).await
    }

    /// All models, in creation order.
    pub async fn list_all(&self) -> StoreResult<Vec<AiModel>> {
        let ids = read_id_list(&*self.store, keys::ALL_MODELS).await?;
        fetch_many(&*self.store, &ids, keys::model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use serde_json::json;

    fn repo() -> ModelRepository {
        ModelRepository::new(MemoryStore::shared())
    }

    async fn create(models: &ModelRepository, owner: &str) -> AiModel {
        models
            .create("mnist", None, ModelType::Onnx, true, owner, json!({}))
            .await
            .expect("create")
    }

    #[tokio::test]
    async fn create_appears_in_both_indices() {
        let models = repo();
        let model = create(&models, "user-1").await;

        let by_owner = models.list_by_owner("user-1").await.expect("list");
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].id, model.id);

        let all = models.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn delete_scrubs_every_index() {
        let models = repo();
        let a = create(&models, "user-1").await;
        let b = create(&models, "user-1").await;

        assert!(models.delete(&a.id).await.expect("delete"));

        assert!(models.get(&a.id).await.expect("get").is_none());
        let by_owner = models.list_by_owner("user-1").await.expect("list");
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].id, b.id);
        assert_eq!(models.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let models = repo();
        assert!(!models.delete("model-missing").await.expect("delete"));
    }

    #[tokio::test]
    async fn sequential_create_delete_matches_primary_set() {
        let models = repo();
        let a = create(&models, "user-1").await;
        let b = create(&models, "user-2").await;
        let c = create(&models, "user-1").await;
        models.delete(&b.id).await.expect("delete");

        let all: Vec<String> = models
            .list_all()
            .await
            .expect("list")
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(all, vec![a.id.clone(), c.id.clone()]);

        let owned: Vec<String> = models
            .list_by_owner("user-1")
            .await
            .expect("list")
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(owned, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let models = repo();
        let model = create(&models, "user-1").await;

        let updated = models
            .update(
                &model.id,
                ModelUpdate {
                    file_path: Some("/data/mnist.onnx".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("exists");

        assert_eq!(updated.file_path.as_deref(), Some("/data/mnist.onnx"));
        assert_eq!(updated.name, "mnist");
    }

    #[tokio::test]
    async fn record_inference_updates_rollups() {
        let models = repo();
        let model = create(&models, "user-1").await;

        models.record_inference(&model.id, 40).await.expect("record");
        models.record_inference(&model.id, 20).await.expect("record");

        let fetched = models.get(&model.id).await.expect("get").expect("exists");
        assert_eq!(fetched.total_inferences, 2);
        assert!((fetched.average_latency_ms - 30.0).abs() < f64::EPSILON);
    }
}
