//! Concurrent fan-out of one image over many candidate models.
//!
//! [`InferenceOrchestrator::stream_inference`] spawns one pipeline per candidate and
//! returns an [`InferenceStream`] that yields events as pipelines settle. A failing
//! model never blocks or fails the others.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod stream;


pub use cancel::CancellationHandle;
pub use config::OrchestratorConfig;
pub use engine::InferenceOrchestrator;
pub use error::OrchestratorError;
pub use events::InferenceEvent;
pub use stream::InferenceStream;
