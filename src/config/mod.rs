//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `SCOUT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_INFERENCE_URL, DEFAULT_INITIAL_BACKOFF,
    DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_JITTER,
};
use crate::inference::RetryPolicy;
use crate::orchestrator::OrchestratorConfig;
use crate::scoring::MetadataScorerConfig;

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SCOUT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference service. Default: `https://detect.roboflow.com`.
    pub inference_url: String,

    /// API key appended as `?api_key=` to every inference request.
    pub api_key: Option<String>,

    /// Minimum prediction confidence for overlap scoring. Default: `0.5`.
    pub confidence_threshold: f64,

    /// Attempts per inference call, first try included. Default: `5`.
    pub max_attempts: u32,

    /// Base backoff delay. Default: `1000ms`.
    pub initial_backoff: Duration,

    /// Upper bound of the uniform jitter added to each delay. Default: `1000ms`.
    pub max_jitter: Duration,

    /// Maximum number of concurrent inference calls. `None` means unbounded.
    pub concurrency_limit: Option<usize>,

    /// Per-request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,

    /// Distance above which a fuzzy match is discarded. Default: `0.6`.
    pub match_threshold: f64,

    /// Prepared corpora kept by the metadata scorer. Default: `1024`.
    pub match_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            api_key: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_jitter: DEFAULT_MAX_JITTER,
            concurrency_limit: None,
            request_timeout: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            match_cache_capacity: DEFAULT_MATCH_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_INFERENCE_URL: &'static str = "SCOUT_INFERENCE_URL";
    const ENV_API_KEY: &'static str = "SCOUT_API_KEY";
    const ENV_CONFIDENCE_THRESHOLD: &'static str = "SCOUT_CONFIDENCE_THRESHOLD";
    const ENV_MAX_ATTEMPTS: &'static str = "SCOUT_MAX_ATTEMPTS";
    const ENV_INITIAL_BACKOFF_MS: &'static str = "SCOUT_INITIAL_BACKOFF_MS";
    const ENV_MAX_JITTER_MS: &'static str = "SCOUT_MAX_JITTER_MS";
    const ENV_CONCURRENCY_LIMIT: &'static str = "SCOUT_CONCURRENCY_LIMIT";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "SCOUT_REQUEST_TIMEOUT_SECS";
    const ENV_MATCH_THRESHOLD: &'static str = "SCOUT_MATCH_THRESHOLD";
    const ENV_MATCH_CACHE_CAPACITY: &'static str = "SCOUT_MATCH_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let inference_url =
            Self::parse_string_from_env(Self::ENV_INFERENCE_URL, defaults.inference_url);
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let confidence_threshold =
            Self::parse_from_env(Self::ENV_CONFIDENCE_THRESHOLD, defaults.confidence_threshold)?;
        let max_attempts = Self::parse_from_env(Self::ENV_MAX_ATTEMPTS, defaults.max_attempts)?;
        let initial_backoff = Self::parse_optional_from_env::<u64>(Self::ENV_INITIAL_BACKOFF_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);
        let max_jitter = Self::parse_optional_from_env::<u64>(Self::ENV_MAX_JITTER_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_jitter);
        let concurrency_limit = Self::parse_optional_from_env(Self::ENV_CONCURRENCY_LIMIT)?;
        let request_timeout = Self::parse_optional_from_env::<u64>(Self::ENV_REQUEST_TIMEOUT_SECS)?
            .map(Duration::from_secs);
        let match_threshold =
            Self::parse_from_env(Self::ENV_MATCH_THRESHOLD, defaults.match_threshold)?;
        let match_cache_capacity =
            Self::parse_from_env(Self::ENV_MATCH_CACHE_CAPACITY, defaults.match_cache_capacity)?;

        Ok(Self {
            inference_url,
            api_key,
            confidence_threshold,
            max_attempts,
            initial_backoff,
            max_jitter,
            concurrency_limit,
            request_timeout,
            match_threshold,
            match_cache_capacity,
        })
    }

    /// Validates ranges and the inference URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.inference_url).map_err(|e| ConfigError::InvalidUrl {
            value: self.inference_url.clone(),
            reason: e.to_string(),
        })?;

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "confidence_threshold",
                value: self.confidence_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "match_threshold",
                value: self.match_threshold,
            });
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        if self.concurrency_limit == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }

        if self.match_cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }

        Ok(())
    }

    /// Retry policy for the inference client.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: self.initial_backoff,
            max_jitter: self.max_jitter,
        }
    }

    /// Orchestrator settings derived from this config.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            inference_url: self.inference_url.clone(),
            concurrency_limit: self.concurrency_limit,
        }
    }

    /// Metadata scorer settings derived from this config.
    pub fn metadata_config(&self) -> MetadataScorerConfig {
        MetadataScorerConfig {
            match_threshold: self.match_threshold,
            cache_capacity: self.match_cache_capacity,
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(Self::parse_optional_from_env(var_name)?.unwrap_or(default))
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::ParseError {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}
