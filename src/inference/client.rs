use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::backend::{ImagePayload, InferenceBackend};
use super::error::InferenceError;
use super::retry::RetryPolicy;
use crate::model::InferenceResult;
use crate::orchestrator::CancellationHandle;

/// Runs one model's inference call with retry and backoff.
///
/// Stateless across calls; clones share the backend.
#[derive(Clone)]
pub struct InferenceClient {
    backend: Arc<dyn InferenceBackend>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl InferenceClient {
    pub fn new(backend: Arc<dyn InferenceBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Calls `endpoint` until it succeeds or the attempt budget is spent.
    ///
    /// Intermediate failures are logged and swallowed. The final one comes back as
    /// [`InferenceError::ExhaustedRetries`]. A malformed 2xx body is returned at once.
    /// Cancellation is checked before every attempt and races every request and sleep.
    pub async fn infer(
        &self,
        model_id: &str,
        endpoint: &str,
        image: &ImagePayload,
        cancel: &CancellationHandle,
    ) -> Result<InferenceResult, InferenceError> {
        let max_attempts = self.policy.attempts();
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(InferenceError::Cancelled);
            }

            debug!(
                model_id = model_id,
                attempt = attempt + 1,
                max_attempts = max_attempts,
                image = image.fingerprint(),
                "Issuing inference request"
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(InferenceError::Cancelled),
                res = self.backend.infer_once(endpoint, image) => res,
            };

            let err = match outcome {
                Ok(response) => {
                    let result = response.into_result(model_id, started.elapsed());
                    debug!(
                        model_id = model_id,
                        attempt = attempt + 1,
                        predictions = result.predictions.len(),
                        "Inference succeeded"
                    );
                    return Ok(result);
                }
                Err(err) if !err.is_retryable() => {
                    warn!(model_id = model_id, error = %err, "Inference failed without retry");
                    return Err(err);
                }
                Err(err) => err,
            };

            attempt += 1;
            if attempt >= max_attempts {
                return Err(InferenceError::ExhaustedRetries {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.delay_for(attempt - 1);
            warn!(
                model_id = model_id,
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Inference attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(InferenceError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
