//! Runner classification and the inference capability.
//!
//! The engine never loads model binaries itself. It classifies which
//! execution path a `(model, input)` pair belongs to and hands the pair to
//! an [`InferenceRunner`]. The built-in [`SimulatedRunner`] stands in for
//! the real execution kernels.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::time::Instant;
use vinfer_core::{AiModel, ModelType};

use crate::error::{EngineError, EngineResult};

/// File extension that routes a custom model to the tabular path.
const TABULAR_EXTENSION: &str = ".pkl";

/// The execution path an inference dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerKind {
    /// File-backed graph execution (ONNX).
    Tensor,
    /// Tabular classifier loaded from a serialized checkpoint.
    Tabular,
    /// Text classification over a `text` input field.
    Text,
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tensor => write!(f, "tensor"),
            Self::Tabular => write!(f, "tabular"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl RunnerKind {
    /// Classify which execution path serves a `(model, input)` pair.
    ///
    /// Dispatch policy, in order: an ONNX model with a stored file uses the
    /// tensor path; a custom model whose file ends in `.pkl` uses the
    /// tabular path; any input carrying a `text` field uses the text path.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedModel`] when no path matches.
    pub fn classify(model: &AiModel, input: &Value) -> EngineResult<Self> {
        if model.model_type == ModelType::Onnx && model.file_path.is_some() {
            return Ok(Self::Tensor);
        }
        if model.model_type == ModelType::Custom
            && model
                .file_path
                .as_deref()
                .is_some_and(|path| path.ends_with(TABULAR_EXTENSION))
        {
            return Ok(Self::Tabular);
        }
        if input.get("text").is_some() {
            return Ok(Self::Text);
        }
        Err(EngineError::unsupported(format!(
            "no runner for model type {} with this input shape",
            model.model_type
        )))
    }
}

/// The result of one inference execution.
#[derive(Debug, Clone)]
pub struct InferenceOutcome {
    /// Model output payload.
    pub output: Value,
    /// Wall-clock execution latency in milliseconds.
    pub latency_ms: u64,
}

/// Executes a model against an input payload.
#[async_trait]
pub trait InferenceRunner: Send + Sync {
    /// Run the model, returning its output and latency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedModel`] if no execution path
    /// matches, or [`EngineError::Inference`] on a mid-run failure.
    async fn run(&self, model: &AiModel, input: &Value) -> EngineResult<InferenceOutcome>;
}

/// Simulated execution kernels for all three runner paths.
///
/// Stands in for real ONNX / tabular / text backends; output shapes match
/// what the real kernels produce.
#[derive(Debug, Default, Clone)]
pub struct SimulatedRunner;

impl SimulatedRunner {
    /// Create a simulated runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn run_tensor(input: &Value) -> EngineResult<Value> {
        let values = input
            .get("image")
            .or_else(|| input.get("features"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EngineError::inference("invalid input format, expected \"image\" or \"features\"")
            })?;

        // One logit per input element, normalized into [0, 1)
        let predictions: Vec<f64> = values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0).fract().abs())
            .collect();
        let len = predictions.len();
        Ok(json!({
            "predictions": predictions,
            "shape": [1, len],
        }))
    }

    fn run_tabular(input: &Value) -> EngineResult<Value> {
        let features = input
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| EngineError::inference("tabular input requires a \"features\" array"))?;

        // Iris-style heuristic keyed on the third feature (petal length)
        let classes = ["setosa", "versicolor", "virginica"];
        let petal_length = features.get(2).and_then(Value::as_f64).unwrap_or(0.0);
        let prediction = if petal_length < 2.5 {
            0
        } else if petal_length < 5.0 {
            1
        } else {
            2
        };
        let probabilities: Vec<f64> = (0..classes.len())
            .map(|i| if i == prediction { 0.95 } else { 0.025 })
            .collect();
        Ok(json!({
            "prediction": classes[prediction],
            "probabilities": probabilities,
        }))
    }

    fn run_text(input: &Value) -> EngineResult<Value> {
        let text = input
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::inference("text input must be a string"))?;

        let negative_cues = ["bad", "terrible", "awful", "hate", "worst"];
        let lowered = text.to_lowercase();
        let negative = negative_cues.iter().any(|cue| lowered.contains(cue));
        Ok(json!({
            "label": if negative { "NEGATIVE" } else { "POSITIVE" },
            "score": if negative { 0.91 } else { 0.97 },
        }))
    }
}

#[async_trait]
impl InferenceRunner for SimulatedRunner {
    async fn run(&self, model: &AiModel, input: &Value) -> EngineResult<InferenceOutcome> {
        let kind = RunnerKind::classify(model, input)?;
        let started = Instant::now();
        let output = match kind {
            RunnerKind::Tensor => Self::run_tensor(input)?,
            RunnerKind::Tabular => Self::run_tabular(input)?,
            RunnerKind::Text => Self::run_text(input)?,
        };
        // Simulated kernels finish in microseconds; clamp to a visible floor
        let latency_ms = u64::try_from(started.elapsed().as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        Ok(InferenceOutcome { output, latency_ms })
    }
}
