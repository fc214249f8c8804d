use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::ProviderError;
use super::provider::{CandidateProvider, SearchCriteria};
use crate::model::ModelCandidate;

/// [`CandidateProvider`] returning a fixed list, truncated to `criteria.limit`.
#[derive(Debug, Default)]
pub struct StaticCandidateProvider {
    candidates: Vec<ModelCandidate>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_criteria: Mutex<Option<SearchCriteria>>,
}

impl StaticCandidateProvider {
    pub fn new(candidates: Vec<ModelCandidate>) -> Self {
        Self {
            candidates,
            ..Default::default()
        }
    }

    /// A provider whose every call fails with [`ProviderError::Unavailable`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }

    pub fn last_criteria(&self) -> Option<SearchCriteria> {
        self.last_criteria.lock().clone()
    }
}

#[async_trait]
impl CandidateProvider for StaticCandidateProvider {
    async fn candidates(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ModelCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        *self.last_criteria.lock() = Some(criteria.clone());

        if let Some(reason) = &self.failure {
            return Err(ProviderError::Unavailable {
                reason: reason.clone(),
            });
        }

        let limit = criteria.limit.unwrap_or(self.candidates.len());
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }
}
