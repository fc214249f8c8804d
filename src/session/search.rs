use futures_util::StreamExt;
use tracing::{info, warn};

use super::collector::ResultCollector;
use super::error::SessionError;
use super::provider::{CandidateProvider, SearchCriteria};
use crate::inference::ImagePayload;
use crate::model::ModelCandidate;
use crate::orchestrator::{InferenceOrchestrator, InferenceStream};

/// One search: the candidates the provider returned and their live inference stream.
#[derive(Debug)]
pub struct SearchSession {
    criteria: SearchCriteria,
    candidates: Vec<ModelCandidate>,
    stream: InferenceStream,
}

impl SearchSession {
    /// Fetches candidates, then starts inference over all of them.
    ///
    /// A provider failure aborts the session before any inference call.
    pub async fn start(
        provider: &dyn CandidateProvider,
        orchestrator: &InferenceOrchestrator,
        criteria: SearchCriteria,
        image: ImagePayload,
    ) -> Result<Self, SessionError> {
        let candidates = provider
            .candidates(&criteria)
            .await
            .inspect_err(|e| warn!(error = %e, "Candidate provider failed"))?;

        let stream = orchestrator.stream_inference(image, candidates.clone())?;

        info!(
            request_id = %stream.request_id(),
            candidates = candidates.len(),
            targets = criteria.target_classes.len(),
            "Search session started"
        );

        Ok(Self {
            criteria,
            candidates,
            stream,
        })
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub fn stream_mut(&mut self) -> &mut InferenceStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> InferenceStream {
        self.stream
    }

    pub fn cancel(&self) {
        self.stream.cancel();
    }

    /// Drains the stream into a [`ResultCollector`].
    ///
    /// Stops early if the stream is cancelled, in which case the collector is not
    /// complete.
    pub async fn collect(mut self) -> ResultCollector {
        let mut collector = ResultCollector::with_candidates(self.candidates.clone());
        while let Some(event) = self.stream.next().await {
            collector.apply(&event);
        }
        collector
    }
}
