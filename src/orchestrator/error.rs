use thiserror::Error;

/// Errors raised before a stream starts. Per-model failures are events, not errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Two candidates share an id.
    #[error("duplicate candidate id: {id}")]
    DuplicateCandidate { id: String },

    /// A candidate failed basic validation.
    #[error("invalid candidate: {reason}")]
    InvalidCandidate { reason: String },
}
