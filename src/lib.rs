//! Scout library crate (used by the `scout` binary and integration tests).
//!
//! Runs one image through many candidate detection models concurrently, streams each
//! model's outcome as it settles, and ranks the candidates against what the user drew
//! and asked for.
//!
//! # Public API Surface
//!
//! ## Inference
//! - [`InferenceClient`], [`RetryPolicy`] - one model call with retry and backoff
//! - [`InferenceBackend`], [`HttpInferenceBackend`] - the single-request transport
//!
//! ## Orchestration
//! - [`InferenceOrchestrator`] - fan-out over every candidate
//! - [`InferenceStream`], [`InferenceEvent`], [`CancellationHandle`] - the event stream
//!
//! ## Scoring
//! - [`OverlapScorer`], [`MetadataScorer`] - individual signals
//! - [`RankingEngine`] - presence-aware combination into a ranking
//!
//! ## Sessions
//! - [`CandidateProvider`], [`SearchSession`], [`ResultCollector`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod inference;
pub mod model;
pub mod orchestrator;
pub mod scoring;
pub mod session;

pub use config::{Config, ConfigError};
pub use hashing::{hash_corpus_key, hash_to_u64, image_fingerprint};
pub use inference::{
    HttpInferenceBackend, ImagePayload, InferenceBackend, InferenceClient, InferenceError,
    InferenceResponse, RetryPolicy,
};
#[cfg(any(test, feature = "mock"))]
pub use inference::{MockBehavior, MockInferenceBackend};
pub use model::{
    ClassCount, DrawnBox, FrameTransform, ImageFrame, InferenceResult, ModelCandidate, Point,
    PredictedBox, Rect,
};
pub use orchestrator::{
    CancellationHandle, InferenceEvent, InferenceOrchestrator, InferenceStream,
    OrchestratorConfig, OrchestratorError,
};
pub use scoring::{
    ApproximateStringMatcher, DamerauMatcher, MetadataScorer, MetadataScorerConfig,
    OverlapScorer, RankedCandidate, RankingEngine, RankingQuery, ScoreComponents, ScoringError,
};
#[cfg(any(test, feature = "mock"))]
pub use session::StaticCandidateProvider;
pub use session::{
    CandidateProvider, ModelStatus, ProviderError, ResultCollector, SearchCriteria,
    SearchSession, SessionError,
};
