use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::stream::Stream;
use serde::Deserialize;
use tracing::info;

use super::error::GatewayError;
use super::streaming::into_sse;
use crate::inference::ImagePayload;
use crate::model::ModelCandidate;
use crate::orchestrator::InferenceOrchestrator;

/// Body of `POST /v1/inference/stream`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    /// Base64 image bytes, optionally as a `data:` URL.
    pub image: String,
    pub candidates: Vec<ModelCandidate>,
}

/// Strips a `data:<mime>;base64,` prefix and checks the rest decodes.
pub fn decode_image(image: &str) -> Result<ImagePayload, GatewayError> {
    let encoded = match image.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| GatewayError::InvalidRequest("malformed data URL".to_string()))?,
        None => image,
    }
    .trim();

    if encoded.is_empty() {
        return Err(GatewayError::InvalidRequest("image is empty".to_string()));
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| GatewayError::InvalidRequest(format!("image is not valid base64: {e}")))?;

    Ok(ImagePayload::from_bytes(&bytes))
}

pub async fn stream_inference_handler(
    State(orchestrator): State<Arc<InferenceOrchestrator>>,
    Json(request): Json<StreamRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, GatewayError> {
    let image = decode_image(&request.image)?;
    let candidates = request.candidates.len();
    let stream = orchestrator.stream_inference(image, request.candidates)?;

    info!(
        request_id = %stream.request_id(),
        candidates = candidates,
        "Streaming inference over SSE"
    );
    Ok(into_sse(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_data_url() {
        let plain = decode_image("aGVsbG8=").expect("valid base64");
        let data_url = decode_image("data:image/jpeg;base64,aGVsbG8=").expect("valid data url");

        assert_eq!(plain.as_base64(), "aGVsbG8=");
        assert_eq!(plain.fingerprint(), data_url.fingerprint());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode_image(""),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            decode_image("data:image/png;base64"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            decode_image("not base64!"),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
