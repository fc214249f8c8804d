//! Inference service request/response payloads.
//!
//! Success body: `{ inference_id, time, image: {width, height}, predictions: [...] }`.
//! Unknown fields are ignored; `image` is required.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::{InferenceResult, PredictedBox};

/// Native size of the image the service ran on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    #[serde(default)]
    pub inference_id: Option<String>,
    /// Server-side processing time in seconds.
    #[serde(default)]
    pub time: Option<f64>,
    pub image: ImageSize,
    #[serde(default)]
    pub predictions: Vec<PredictedBox>,
}

impl InferenceResponse {
    pub fn new(width: f64, height: f64, predictions: Vec<PredictedBox>) -> Self {
        Self {
            inference_id: None,
            time: None,
            image: ImageSize { width, height },
            predictions,
        }
    }

    /// Converts into an [`InferenceResult`].
    ///
    /// `elapsed_seconds` prefers the server-reported `time` and falls back to `measured`.
    pub fn into_result(self, model_id: &str, measured: Duration) -> InferenceResult {
        let elapsed = self
            .time
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or_else(|| measured.as_secs_f64());

        InferenceResult::success(
            model_id,
            self.predictions,
            to_pixels(self.image.width),
            to_pixels(self.image.height),
            elapsed,
        )
    }
}

#[inline]
fn to_pixels(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
