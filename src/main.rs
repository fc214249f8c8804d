//! Scout entrypoint.
//!
//! ```text
//! scout <candidates.json> <image> [query.json]   stream inference, then print the ranking
//! scout serve [addr]                             serve POST /v1/inference/stream over SSE
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use futures_util::StreamExt;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use scout::config::Config;
use scout::gateway::create_router;
use scout::inference::ImagePayload;
use scout::model::{ImageFrame, ModelCandidate};
use scout::orchestrator::InferenceOrchestrator;
use scout::scoring::{RankingEngine, RankingQuery};
use scout::session::ResultCollector;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd] if cmd == "serve" => serve(&config, DEFAULT_BIND_ADDR).await,
        [cmd, addr] if cmd == "serve" => serve(&config, addr).await,
        [candidates, image] => rank(&config, candidates, image, None).await,
        [candidates, image, query] => rank(&config, candidates, image, Some(query.as_str())).await,
        _ => bail!("usage: scout <candidates.json> <image> [query.json] | scout serve [addr]"),
    }
}

async fn rank(
    config: &Config,
    candidates_path: &str,
    image_path: &str,
    query_path: Option<&str>,
) -> anyhow::Result<()> {
    let candidates: Vec<ModelCandidate> = read_json(candidates_path).await?;
    let image = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("reading image {image_path}"))?;
    let query = match query_path {
        Some(path) => read_json(path).await?,
        None => RankingQuery::new(ImageFrame::new(0.0, 0.0))
            .with_confidence_threshold(config.confidence_threshold),
    };

    let orchestrator = InferenceOrchestrator::from_config(config);
    let engine = RankingEngine::from_config(config)?;

    let mut stream =
        orchestrator.stream_inference(ImagePayload::from_bytes(&image), candidates)?;

    let cancel = stream.cancellation_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling inference");
            cancel.cancel();
        }
    });

    let mut collector = ResultCollector::new();
    while let Some(event) = stream.next().await {
        println!("{}", serde_json::to_string(&event)?);
        collector.apply(&event);
    }

    if !collector.is_complete() {
        tracing::warn!(
            pending = collector.pending_count(),
            "Inference stopped before completion, ranking partial results"
        );
    }

    let ranked = collector.rank(&engine, &query);
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

async fn serve(config: &Config, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr.parse().with_context(|| format!("parsing bind address {addr}"))?;
    let orchestrator = Arc::new(InferenceOrchestrator::from_config(config));
    let app = create_router(orchestrator);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, inference_url = %config.inference_url, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Scout shutdown complete");
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
