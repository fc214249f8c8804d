use serde::{Deserialize, Serialize};

use crate::model::{InferenceResult, ModelCandidate};

/// One event of the inference stream.
///
/// Order: exactly one [`Models`](Self::Models), then one [`Inference`](Self::Inference)
/// or [`Error`](Self::Error) per candidate in settle order, then exactly one
/// [`Complete`](Self::Complete). Serialised with a `type` tag and camelCase fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InferenceEvent {
    /// The full candidate list, sent before any call settles.
    Models { models: Vec<ModelCandidate> },
    /// A candidate's call succeeded.
    Inference {
        #[serde(rename = "modelId")]
        model_id: String,
        result: InferenceResult,
    },
    /// A candidate's call failed for good.
    Error {
        #[serde(rename = "modelId")]
        model_id: String,
        error: String,
    },
    /// All candidates have settled.
    Complete,
}

impl InferenceEvent {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceEvent::Models { .. } => "models",
            InferenceEvent::Inference { .. } => "inference",
            InferenceEvent::Error { .. } => "error",
            InferenceEvent::Complete => "complete",
        }
    }

    /// The model this event settles, if any.
    pub fn model_id(&self) -> Option<&str> {
        match self {
            InferenceEvent::Inference { model_id, .. } | InferenceEvent::Error { model_id, .. } => {
                Some(model_id)
            }
            InferenceEvent::Models { .. } | InferenceEvent::Complete => None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, InferenceEvent::Complete)
    }
}
