//! Per-model inference calls with retry/backoff.
//!
//! [`InferenceClient`] owns the retry loop; [`InferenceBackend`] performs exactly one
//! request. Transient failures (transport errors, non-2xx) are retried up to
//! [`RetryPolicy::max_attempts`]; malformed 2xx bodies are not.

pub mod backend;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod retry;
pub mod wire;

#[cfg(test)]
mod tests;

pub use backend::{HttpInferenceBackend, ImagePayload, InferenceBackend};
pub use client::InferenceClient;
pub use error::InferenceError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBehavior, MockInferenceBackend};
pub use retry::RetryPolicy;
pub use wire::{ImageSize, InferenceResponse};
