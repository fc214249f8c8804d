//! Mock inference service.
//!
//! Serves `POST /{model...}` the way the hosted detection service does: the image
//! arrives as a base64 form body, the API key as a query parameter. Each model path
//! answers according to a scripted [`Route`]; every hit is recorded.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with the JSON body.
    Json(Value),
    /// Always the given status.
    Status(u16),
    /// `failures` times 500, then 200 with the JSON body.
    Flaky { failures: usize, body: Value },
    /// 200 with a raw, possibly unparsable, body.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Hit {
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct ServerState {
    routes: HashMap<String, Route>,
    hits: Mutex<HashMap<String, Vec<Hit>>>,
}

pub struct MockInferenceServer {
    pub addr: SocketAddr,
    state: Arc<ServerState>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockInferenceServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/{}", self.url(), model)
    }

    pub fn hits(&self, model: &str) -> Vec<Hit> {
        self.state.hits.lock().get(model).cloned().unwrap_or_default()
    }

    pub fn hit_count(&self, model: &str) -> usize {
        self.state.hits.lock().get(model).map_or(0, Vec::len)
    }
}

impl Drop for MockInferenceServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds a success body in the service's wire format.
pub fn detection_body(width: u32, height: u32, predictions: &[(&str, f64, f64, f64, f64, f64)]) -> Value {
    let predictions: Vec<Value> = predictions
        .iter()
        .map(|(class, x, y, w, h, confidence)| {
            json!({
                "class": class,
                "x": x,
                "y": y,
                "width": w,
                "height": h,
                "confidence": confidence,
                "class_id": 0,
            })
        })
        .collect();

    json!({
        "inference_id": "6f1c2a9e",
        "time": 0.042,
        "image": { "width": width, "height": height },
        "predictions": predictions,
    })
}

pub async fn spawn_mock_inference_server(routes: Vec<(&str, Route)>) -> std::io::Result<MockInferenceServer> {
    let state = Arc::new(ServerState {
        routes: routes
            .into_iter()
            .map(|(model, route)| (model.to_string(), route))
            .collect(),
        hits: Mutex::new(HashMap::new()),
    });

    let app = Router::new()
        .route("/{*model}", post(infer_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    Ok(MockInferenceServer {
        addr,
        state,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

async fn infer_handler(
    State(state): State<Arc<ServerState>>,
    Path(model): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let model = model.trim_start_matches('/').to_string();
    let hit = Hit {
        api_key: params.get("api_key").cloned(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let attempt = {
        let mut hits = state.hits.lock();
        let entry = hits.entry(model.clone()).or_default();
        entry.push(hit);
        entry.len()
    };

    match state.routes.get(&model) {
        Some(Route::Json(body)) => Json(body.clone()).into_response(),
        Some(Route::Status(code)) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "scripted failure").into_response()
        }
        Some(Route::Flaky { failures, body }) => {
            if attempt <= *failures {
                (StatusCode::INTERNAL_SERVER_ERROR, "warming up").into_response()
            } else {
                Json(body.clone()).into_response()
            }
        }
        Some(Route::Raw(raw)) => (StatusCode::OK, raw.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "unknown model").into_response(),
    }
}
