use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::backend::{ImagePayload, InferenceBackend};
use super::error::InferenceError;
use super::wire::InferenceResponse;

/// Scripted behaviour for one endpoint of [`MockInferenceBackend`].
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always returns the response.
    Succeed(InferenceResponse),
    /// Always fails with a transport error.
    FailTransient,
    /// Always answers with the given non-2xx status.
    FailStatus(u16),
    /// Always answers 2xx with an unparsable body.
    Malformed,
    /// Fails `failures` times with a transport error, then succeeds.
    FailThenSucceed {
        failures: usize,
        response: InferenceResponse,
    },
    /// Never resolves.
    Hang,
}

/// In-memory [`InferenceBackend`] keyed by endpoint.
///
/// Records the (tokio) instant of every call so tests can check backoff timing under a
/// paused clock, and tracks peak concurrency.
#[derive(Default)]
pub struct MockInferenceBackend {
    behaviors: HashMap<String, MockBehavior>,
    delays: HashMap<String, Duration>,
    default_behavior: Option<MockBehavior>,
    calls: Mutex<HashMap<String, Vec<Instant>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockInferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, endpoint: impl Into<String>, behavior: MockBehavior) -> Self {
        self.behaviors.insert(endpoint.into(), behavior);
        self
    }

    /// Behaviour for endpoints without an explicit script (default: HTTP 404).
    pub fn with_default(mut self, behavior: MockBehavior) -> Self {
        self.default_behavior = Some(behavior);
        self
    }

    /// Latency added before the endpoint answers.
    pub fn with_delay(mut self, endpoint: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(endpoint.into(), delay);
        self
    }

    /// Number of calls made to `endpoint`.
    pub fn attempts(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).map_or(0, Vec::len)
    }

    /// Instants at which `endpoint` was called.
    pub fn call_times(&self, endpoint: &str) -> Vec<Instant> {
        self.calls.lock().get(endpoint).cloned().unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().map(Vec::len).sum()
    }

    /// Highest number of simultaneously running calls observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    fn record_call(&self, endpoint: &str) -> usize {
        let mut calls = self.calls.lock();
        let times = calls.entry(endpoint.to_string()).or_default();
        times.push(Instant::now());
        times.len()
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl InferenceBackend for MockInferenceBackend {
    async fn infer_once(
        &self,
        endpoint: &str,
        _image: &ImagePayload,
    ) -> Result<InferenceResponse, InferenceError> {
        let call_number = self.record_call(endpoint);

        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        let _guard = InFlightGuard(&self.in_flight);

        if let Some(delay) = self.delays.get(endpoint) {
            tokio::time::sleep(*delay).await;
        }

        let behavior = self
            .behaviors
            .get(endpoint)
            .or(self.default_behavior.as_ref())
            .cloned();

        match behavior {
            Some(MockBehavior::Succeed(response)) => Ok(response),
            Some(MockBehavior::FailTransient) => Err(InferenceError::Transport {
                endpoint: endpoint.to_string(),
                message: "connection reset by peer".to_string(),
            }),
            Some(MockBehavior::FailStatus(status)) => Err(InferenceError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: "mock failure".to_string(),
            }),
            Some(MockBehavior::Malformed) => Err(InferenceError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            }),
            Some(MockBehavior::FailThenSucceed { failures, response }) => {
                if call_number <= failures {
                    Err(InferenceError::Transport {
                        endpoint: endpoint.to_string(),
                        message: format!("scripted failure {call_number}/{failures}"),
                    })
                } else {
                    Ok(response)
                }
            }
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(InferenceError::Status {
                endpoint: endpoint.to_string(),
                status: 404,
                body: "no mock behaviour registered".to_string(),
            }),
        }
    }
}
