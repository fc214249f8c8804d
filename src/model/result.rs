use serde::{Deserialize, Serialize};

use super::geometry::PredictedBox;

/// Outcome of one model's inference call for one request.
///
/// Successful results carry predictions; failed ones carry `error` and are never ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub model_id: String,
    #[serde(default)]
    pub predictions: Vec<PredictedBox>,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub elapsed_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InferenceResult {
    pub fn success(
        model_id: impl Into<String>,
        predictions: Vec<PredictedBox>,
        image_width: u32,
        image_height: u32,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            predictions,
            image_width,
            image_height,
            elapsed_seconds,
            error: None,
        }
    }

    /// Placeholder result for a model whose call failed.
    pub fn failed(model_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            predictions: Vec::new(),
            image_width: 0,
            image_height: 0,
            elapsed_seconds: 0.0,
            error: Some(error.into()),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
