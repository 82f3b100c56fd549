//! AI model records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::id::entity_id;

/// Supported model formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// ONNX graph, executed from a stored file.
    Onnx,
    /// PyTorch checkpoint.
    Pytorch,
    /// TensorFlow saved model.
    Tensorflow,
    /// Anything else, dispatched on file extension.
    Custom,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Onnx => write!(f, "onnx"),
            Self::Pytorch => write!(f, "pytorch"),
            Self::Tensorflow => write!(f, "tensorflow"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A registered AI model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    /// Unique model id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Model format.
    pub model_type: ModelType,
    /// Whether the model is visible to all users.
    pub is_public: bool,
    /// Owning user.
    pub owner_id: String,
    /// Path to the stored model binary, if uploaded.
    pub file_path: Option<String>,
    /// Free-form metadata.
    pub metadata: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of completed inference runs.
    pub total_inferences: u64,
    /// Running average latency over completed runs.
    pub average_latency_ms: f64,
}

impl AiModel {
    /// Create a new model record with zeroed usage counters.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        model_type: ModelType,
        is_public: bool,
        owner_id: impl Into<String>,
        metadata: Value,
    ) -> Self {
        Self {
            id: entity_id("model"),
            name: name.into(),
            description,
            model_type,
            is_public,
            owner_id: owner_id.into(),
            file_path: None,
            metadata,
            created_at: Utc::now(),
            total_inferences: 0,
            average_latency_ms: 0.0,
        }
    }

    /// Fold one completed run into the usage counters (running average).
    pub fn record_inference(&mut self, latency_ms: u64) {
        let prior_total = self.average_latency_ms * self.total_inferences as f64;
        self.total_inferences += 1;
        self.average_latency_ms =
            (prior_total + latency_ms as f64) / self.total_inferences as f64;
    }
}
