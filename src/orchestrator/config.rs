use crate::constants::DEFAULT_INFERENCE_URL;
use crate::model::ModelCandidate;

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Base URL used when a candidate has no explicit endpoint.
    pub inference_url: String,
    /// Maximum concurrent inference calls. `None` issues every call at once.
    pub concurrency_limit: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            concurrency_limit: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn new(inference_url: impl Into<String>) -> Self {
        Self {
            inference_url: inference_url.into(),
            concurrency_limit: None,
        }
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit.max(1));
        self
    }

    /// `candidate.endpoint`, or `{inference_url}/{candidate.id}`.
    pub fn endpoint_for(&self, candidate: &ModelCandidate) -> String {
        match &candidate.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "{}/{}",
                self.inference_url.trim_end_matches('/'),
                candidate.id.trim_start_matches('/')
            ),
        }
    }
}
