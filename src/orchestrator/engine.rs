use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::cancel::CancellationHandle;
use super::config::OrchestratorConfig;
use super::error::OrchestratorError;
use super::events::InferenceEvent;
use super::stream::InferenceStream;
use crate::config::Config;
use crate::inference::{
    HttpInferenceBackend, ImagePayload, InferenceBackend, InferenceClient, InferenceError,
    RetryPolicy,
};
use crate::model::{InferenceResult, ModelCandidate};

type PipelineOutcome = (String, Result<InferenceResult, InferenceError>);

/// Fans inference out over every candidate and streams the outcomes.
#[derive(Debug, Clone)]
pub struct InferenceOrchestrator {
    client: InferenceClient,
    config: OrchestratorConfig,
}

impl InferenceOrchestrator {
    pub fn new(client: InferenceClient, config: OrchestratorConfig) -> Self {
        Self { client, config }
    }

    /// Builds an orchestrator over a custom backend.
    pub fn with_backend(
        backend: Arc<dyn InferenceBackend>,
        policy: RetryPolicy,
        config: OrchestratorConfig,
    ) -> Self {
        Self::new(InferenceClient::new(backend, policy), config)
    }

    /// Builds an HTTP-backed orchestrator from runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        let backend = HttpInferenceBackend::new(config.api_key.clone(), config.request_timeout);
        Self::with_backend(
            Arc::new(backend),
            config.retry_policy(),
            config.orchestrator_config(),
        )
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Starts inference for every candidate and returns the event stream.
    ///
    /// Must be called inside a tokio runtime. Rejects duplicate or empty candidate ids
    /// before any call is issued.
    pub fn stream_inference(
        &self,
        image: ImagePayload,
        candidates: Vec<ModelCandidate>,
    ) -> Result<InferenceStream, OrchestratorError> {
        validate_candidates(&candidates)?;

        let request_id = Uuid::new_v4();
        let cancel = CancellationHandle::new();
        // models + one per candidate + complete: sends never wait on the consumer
        let (tx, rx) = mpsc::channel(candidates.len() + 2);

        info!(
            request_id = %request_id,
            candidates = candidates.len(),
            image = image.fingerprint(),
            concurrency_limit = ?self.config.concurrency_limit,
            "Starting inference stream"
        );

        let driver = tokio::spawn(drive(
            self.client.clone(),
            self.config.clone(),
            image,
            candidates,
            tx,
            cancel.clone(),
            request_id,
        ));

        Ok(InferenceStream::new(
            ReceiverStream::new(rx),
            cancel,
            driver,
            request_id,
        ))
    }
}

fn validate_candidates(candidates: &[ModelCandidate]) -> Result<(), OrchestratorError> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.id.trim().is_empty() {
            return Err(OrchestratorError::InvalidCandidate {
                reason: format!("candidate '{}' has an empty id", candidate.name),
            });
        }
        if !seen.insert(candidate.id.as_str()) {
            return Err(OrchestratorError::DuplicateCandidate {
                id: candidate.id.clone(),
            });
        }
    }
    Ok(())
}

async fn drive(
    client: InferenceClient,
    config: OrchestratorConfig,
    image: ImagePayload,
    candidates: Vec<ModelCandidate>,
    tx: mpsc::Sender<InferenceEvent>,
    cancel: CancellationHandle,
    request_id: Uuid,
) {
    let started = Instant::now();
    let total = candidates.len();

    if tx
        .send(InferenceEvent::Models {
            models: candidates.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let limiter = config.concurrency_limit.map(|n| Arc::new(Semaphore::new(n)));
    let mut pipelines: JoinSet<PipelineOutcome> = JoinSet::new();
    let mut owners = HashMap::with_capacity(total);

    for candidate in &candidates {
        if cancel.is_cancelled() {
            debug!(request_id = %request_id, "Cancelled before all pipelines started");
            pipelines.abort_all();
            return;
        }

        let model_id = candidate.id.clone();
        let endpoint = config.endpoint_for(candidate);
        let handle = pipelines.spawn(run_pipeline(
            client.clone(),
            model_id.clone(),
            endpoint,
            image.clone(),
            cancel.clone(),
            limiter.clone(),
        ));
        owners.insert(handle.id(), model_id);
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                pipelines.abort_all();
                info!(
                    request_id = %request_id,
                    settled = succeeded + failed,
                    total = total,
                    "Inference stream cancelled"
                );
                return;
            }
            joined = pipelines.join_next() => joined,
        };

        let Some(joined) = joined else {
            break;
        };

        let event = match joined {
            Ok((model_id, Ok(result))) => {
                succeeded += 1;
                InferenceEvent::Inference { model_id, result }
            }
            Ok((_, Err(InferenceError::Cancelled))) => continue,
            Ok((model_id, Err(err))) => {
                failed += 1;
                warn!(request_id = %request_id, model_id = %model_id, error = %err, "Model inference failed");
                InferenceEvent::Error {
                    model_id,
                    error: err.to_string(),
                }
            }
            Err(join_err) if join_err.is_cancelled() => continue,
            Err(join_err) => {
                let Some(model_id) = owners.get(&join_err.id()).cloned() else {
                    error!(request_id = %request_id, error = %join_err, "Unattributed pipeline failure");
                    continue;
                };
                failed += 1;
                error!(request_id = %request_id, model_id = %model_id, error = %join_err, "Inference pipeline panicked");
                InferenceEvent::Error {
                    model_id,
                    error: format!("inference pipeline panicked: {join_err}"),
                }
            }
        };

        if tx.send(event).await.is_err() {
            pipelines.abort_all();
            return;
        }
    }

    if cancel.is_cancelled() {
        return;
    }

    info!(
        request_id = %request_id,
        succeeded = succeeded,
        failed = failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Inference stream complete"
    );

    let _ = tx.send(InferenceEvent::Complete).await;
}

async fn run_pipeline(
    client: InferenceClient,
    model_id: String,
    endpoint: String,
    image: ImagePayload,
    cancel: CancellationHandle,
    limiter: Option<Arc<Semaphore>>,
) -> PipelineOutcome {
    let _permit = match limiter {
        Some(limiter) => {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return (model_id, Err(InferenceError::Cancelled)),
                permit = limiter.acquire_owned() => permit,
            };
            match permit {
                Ok(permit) => Some(permit),
                Err(_) => return (model_id, Err(InferenceError::Cancelled)),
            }
        }
        None => None,
    };

    let outcome = client.infer(&model_id, &endpoint, &image, &cancel).await;
    (model_id, outcome)
}
