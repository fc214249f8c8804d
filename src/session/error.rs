use thiserror::Error;

use crate::orchestrator::OrchestratorError;

/// Failures of a [`CandidateProvider`](super::CandidateProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("candidate provider unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("invalid search criteria: {reason}")]
    InvalidCriteria { reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}
