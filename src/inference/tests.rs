use std::sync::Arc;
use std::time::Duration;

use super::client::InferenceClient;
use super::error::InferenceError;
use super::mock::{MockBehavior, MockInferenceBackend};
use super::retry::RetryPolicy;
use super::wire::InferenceResponse;
use super::backend::ImagePayload;
use crate::model::PredictedBox;
use crate::orchestrator::CancellationHandle;

const ENDPOINT: &str = "http://mock/hard-hats/2";

fn image() -> ImagePayload {
    ImagePayload::from_bytes(b"fake-jpeg-bytes")
}

fn response() -> InferenceResponse {
    InferenceResponse::new(
        640.0,
        480.0,
        vec![PredictedBox::new("helmet", 10.0, 10.0, 50.0, 50.0, 0.9)],
    )
}

fn client(backend: &Arc<MockInferenceBackend>, policy: RetryPolicy) -> InferenceClient {
    InferenceClient::new(backend.clone(), policy)
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let backend = Arc::new(
        MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::Succeed(response())),
    );
    let client = client(&backend, RetryPolicy::default());

    let result = client
        .infer("hard-hats/2", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .expect("should succeed");

    assert!(result.is_success());
    assert_eq!(result.model_id, "hard-hats/2");
    assert_eq!(result.image_width, 640);
    assert_eq!(result.predictions.len(), 1);
    assert_eq!(backend.attempts(ENDPOINT), 1);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_endpoint_makes_exactly_five_attempts() {
    let backend =
        Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::FailTransient));
    let client = client(&backend, RetryPolicy::fixed(5, Duration::from_millis(1000)));

    let err = client
        .infer("hard-hats/2", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InferenceError::ExhaustedRetries { attempts: 5, .. }
    ));
    assert_eq!(backend.attempts(ENDPOINT), 5);

    let times = backend.call_times(ENDPOINT);
    let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
            Duration::from_millis(8000),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_jittered_delays_stay_within_bounds() {
    let backend =
        Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::FailStatus(503)));
    let client = client(&backend, RetryPolicy::default());

    let err = client
        .infer("m", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::ExhaustedRetries { .. }));

    let times = backend.call_times(ENDPOINT);
    assert_eq!(times.len(), 5);
    for (i, w) in times.windows(2).enumerate() {
        let gap = w[1] - w[0];
        let base = Duration::from_millis(1000 * (1 << i));
        assert!(gap >= base, "gap {i} too short: {gap:?}");
        assert!(gap <= base + Duration::from_millis(1000), "gap {i} too long: {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_carries_last_error() {
    let backend =
        Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::FailStatus(502)));
    let client = client(&backend, RetryPolicy::fixed(2, Duration::from_millis(10)));

    let err = client
        .infer("m", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .unwrap_err();

    match err {
        InferenceError::ExhaustedRetries { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, InferenceError::Status { status: 502, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() {
    let backend = Arc::new(MockInferenceBackend::new().with_behavior(
        ENDPOINT,
        MockBehavior::FailThenSucceed {
            failures: 2,
            response: response(),
        },
    ));
    let client = client(&backend, RetryPolicy::fixed(5, Duration::from_millis(100)));

    let result = client
        .infer("m", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .expect("third attempt should succeed");

    assert!(result.is_success());
    assert_eq!(backend.attempts(ENDPOINT), 3);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_response_is_not_retried() {
    let backend =
        Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::Malformed));
    let client = client(&backend, RetryPolicy::default());

    let err = client
        .infer("m", ENDPOINT, &image(), &CancellationHandle::new())
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::MalformedResponse { .. }));
    assert!(!err.is_retryable());
    assert_eq!(backend.attempts(ENDPOINT), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_makes_no_call() {
    let backend = Arc::new(
        MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::Succeed(response())),
    );
    let client = client(&backend, RetryPolicy::default());
    let cancel = CancellationHandle::new();
    cancel.cancel();

    let err = client.infer("m", ENDPOINT, &image(), &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(backend.attempts(ENDPOINT), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_stops_retrying() {
    let backend =
        Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::FailTransient));
    let client = client(&backend, RetryPolicy::fixed(5, Duration::from_secs(60)));
    let cancel = CancellationHandle::new();

    let task = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.infer("m", ENDPOINT, &image(), &cancel).await })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.attempts(ENDPOINT), 1);
    cancel.cancel();

    let err = task.await.expect("task should not panic").unwrap_err();
    assert!(err.is_cancelled());

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.attempts(ENDPOINT), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_request() {
    let backend = Arc::new(MockInferenceBackend::new().with_behavior(ENDPOINT, MockBehavior::Hang));
    let client = client(&backend, RetryPolicy::default());
    let cancel = CancellationHandle::new();

    let task = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.infer("m", ENDPOINT, &image(), &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    let err = task.await.expect("task should not panic").unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn test_image_payload_base64() {
    let payload = ImagePayload::from_bytes(b"hello");
    assert_eq!(payload.as_base64(), "aGVsbG8=");
    assert_eq!(payload.fingerprint().len(), 16);

    let pre = ImagePayload::from_base64("aGVsbG8=");
    assert_eq!(pre.as_base64(), "aGVsbG8=");
}

#[test]
fn test_error_retryability() {
    let transport = InferenceError::Transport {
        endpoint: ENDPOINT.to_string(),
        message: "reset".to_string(),
    };
    let status = InferenceError::Status {
        endpoint: ENDPOINT.to_string(),
        status: 500,
        body: String::new(),
    };
    assert!(transport.is_retryable());
    assert!(status.is_retryable());
    assert!(!InferenceError::Cancelled.is_retryable());
}
