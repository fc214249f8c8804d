use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use crate::model::ModelCandidate;

/// What the user is looking for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub target_classes: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_target_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Source of candidate models for a search.
///
/// A failure here is fatal for the session: no inference is started.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn candidates(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ModelCandidate>, ProviderError>;
}
