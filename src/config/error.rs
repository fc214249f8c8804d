//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    ParseError {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Inference URL could not be parsed.
    #[error("invalid inference url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// A threshold fell outside `0.0..=1.0`.
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// `max_attempts` was zero.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// `concurrency_limit` was set to zero.
    #[error("concurrency_limit must be at least 1 when set")]
    ZeroConcurrency,

    /// `match_cache_capacity` was zero.
    #[error("match_cache_capacity must be at least 1")]
    ZeroCacheCapacity,
}
