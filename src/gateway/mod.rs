//! HTTP gateway (Axum) streaming inference events over SSE.

pub mod error;
pub mod handler;
pub mod streaming;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};

pub use error::GatewayError;
pub use handler::{StreamRequest, stream_inference_handler};
pub use streaming::{event_for, into_sse};

use crate::orchestrator::InferenceOrchestrator;

pub fn create_router(orchestrator: Arc<InferenceOrchestrator>) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/inference/stream", post(stream_inference_handler))
        .with_state(orchestrator)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
