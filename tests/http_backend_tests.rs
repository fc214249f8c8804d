//! HTTP backend and retry tests against a local mock inference service.

mod common;

use std::sync::Arc;
use std::time::Duration;

use scout::inference::{
    HttpInferenceBackend, ImagePayload, InferenceBackend, InferenceClient, InferenceError,
    RetryPolicy,
};
use scout::orchestrator::CancellationHandle;

use common::harness::{Route, detection_body, spawn_mock_inference_server};

fn image() -> ImagePayload {
    ImagePayload::from_bytes(b"\xFF\xD8\xFFjpeg-ish bytes")
}

#[tokio::test]
async fn test_request_shape_and_response_parsing() {
    let server = spawn_mock_inference_server(vec![(
        "hard-hats/2",
        Route::Json(detection_body(
            1280,
            720,
            &[("helmet", 100.0, 50.0, 40.0, 40.0, 0.91)],
        )),
    )])
    .await
    .expect("mock server should start");

    let backend = HttpInferenceBackend::new(Some("secret-key".to_string()), None);
    let response = backend
        .infer_once(&server.endpoint("hard-hats/2"), &image())
        .await
        .expect("should parse");

    assert_eq!(response.image.width, 1280.0);
    assert_eq!(response.predictions.len(), 1);
    assert_eq!(response.predictions[0].class, "helmet");
    assert_eq!(response.time, Some(0.042));

    let hits = server.hits("hard-hats/2");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].api_key.as_deref(), Some("secret-key"));
    assert_eq!(
        hits[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(hits[0].body, image().as_base64());
}

#[tokio::test]
async fn test_missing_api_key_sends_no_query() {
    let server = spawn_mock_inference_server(vec![(
        "m/1",
        Route::Json(detection_body(10, 10, &[])),
    )])
    .await
    .expect("mock server should start");

    let backend = HttpInferenceBackend::new(None, None);
    backend
        .infer_once(&server.endpoint("m/1"), &image())
        .await
        .expect("should parse");

    assert_eq!(server.hits("m/1")[0].api_key, None);
}

#[tokio::test]
async fn test_non_2xx_is_status_error() {
    let server = spawn_mock_inference_server(vec![("down/1", Route::Status(503))])
        .await
        .expect("mock server should start");

    let backend = HttpInferenceBackend::new(None, None);
    let err = backend
        .infer_once(&server.endpoint("down/1"), &image())
        .await
        .unwrap_err();

    match err {
        InferenceError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "scripted failure");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let backend = HttpInferenceBackend::new(None, Some(Duration::from_secs(2)));
    let err = backend
        .infer_once("http://127.0.0.1:9/never", &image())
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::Transport { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_recovers_from_transient_failures() {
    let server = spawn_mock_inference_server(vec![(
        "flaky/1",
        Route::Flaky {
            failures: 2,
            body: detection_body(640, 480, &[("cat", 1.0, 2.0, 3.0, 4.0, 0.7)]),
        },
    )])
    .await
    .expect("mock server should start");

    let client = InferenceClient::new(
        Arc::new(HttpInferenceBackend::new(None, None)),
        RetryPolicy::fixed(5, Duration::from_millis(5)),
    );
    let result = client
        .infer(
            "flaky/1",
            &server.endpoint("flaky/1"),
            &image(),
            &CancellationHandle::new(),
        )
        .await
        .expect("third attempt succeeds");

    assert_eq!(server.hit_count("flaky/1"), 3);
    assert_eq!(result.image_width, 640);
    assert_eq!(result.image_height, 480);
    assert_eq!(result.elapsed_seconds, 0.042);
}

#[tokio::test]
async fn test_client_gives_up_after_max_attempts() {
    let server = spawn_mock_inference_server(vec![("broken/1", Route::Status(500))])
        .await
        .expect("mock server should start");

    let client = InferenceClient::new(
        Arc::new(HttpInferenceBackend::new(None, None)),
        RetryPolicy::fixed(3, Duration::from_millis(5)),
    );
    let err = client
        .infer(
            "broken/1",
            &server.endpoint("broken/1"),
            &image(),
            &CancellationHandle::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InferenceError::ExhaustedRetries { attempts: 3, .. }
    ));
    assert_eq!(server.hit_count("broken/1"), 3);
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let server = spawn_mock_inference_server(vec![(
        "garbled/1",
        Route::Raw("<html>gateway hiccup</html>".to_string()),
    )])
    .await
    .expect("mock server should start");

    let client = InferenceClient::new(
        Arc::new(HttpInferenceBackend::new(None, None)),
        RetryPolicy::fixed(5, Duration::from_millis(5)),
    );
    let err = client
        .infer(
            "garbled/1",
            &server.endpoint("garbled/1"),
            &image(),
            &CancellationHandle::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, InferenceError::MalformedResponse { .. }));
    assert_eq!(server.hit_count("garbled/1"), 1);
}
