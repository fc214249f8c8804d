//! Transport seam for inference calls.
//!
//! [`HttpInferenceBackend`] speaks the hosted inference protocol over `reqwest`. The retry
//! loop in [`InferenceClient`](super::InferenceClient) only sees [`InferenceBackend`], so
//! tests swap in [`MockInferenceBackend`](super::MockInferenceBackend).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;

use super::error::InferenceError;
use super::wire::InferenceResponse;
use crate::hashing::image_fingerprint;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Base64-encoded image, encoded once and shared by every model call of a request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    encoded: Arc<str>,
    fingerprint: String,
}

impl ImagePayload {
    /// Encodes raw image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            encoded: Arc::from(BASE64.encode(bytes)),
            fingerprint: image_fingerprint(bytes),
        }
    }

    /// Wraps an already base64-encoded image.
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        let encoded: String = encoded.into();
        let fingerprint = image_fingerprint(encoded.as_bytes());
        Self {
            encoded: Arc::from(encoded),
            fingerprint,
        }
    }

    #[inline]
    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    /// Short content hash for logs.
    #[inline]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[async_trait]
/// Executes exactly one inference request (no retries).
pub trait InferenceBackend: Send + Sync {
    async fn infer_once(
        &self,
        endpoint: &str,
        image: &ImagePayload,
    ) -> Result<InferenceResponse, InferenceError>;
}

/// `POST {endpoint}?api_key=<key>` with the base64 image as a form-encoded body.
pub struct HttpInferenceBackend {
    http: HttpClient,
    api_key: Option<String>,
}

impl HttpInferenceBackend {
    /// Creates a backend. `timeout` of `None` keeps the transport default.
    pub fn new(api_key: Option<String>, timeout: Option<Duration>) -> Self {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            http: builder.build().unwrap_or_else(|_| HttpClient::new()),
            api_key,
        }
    }

    /// Creates a backend from an existing client (shared connection pool).
    pub fn with_client(http: HttpClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn infer_once(
        &self,
        endpoint: &str,
        image: &ImagePayload,
    ) -> Result<InferenceResponse, InferenceError> {
        let mut request = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(image.as_base64().to_owned());

        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| InferenceError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| InferenceError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| InferenceError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}
