use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{InferenceResult, ModelCandidate};
use crate::orchestrator::InferenceEvent;
use crate::scoring::{RankedCandidate, RankingEngine, RankingQuery};

/// Where one candidate's inference stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum ModelStatus {
    Pending,
    Succeeded,
    Failed(String),
}

impl ModelStatus {
    #[inline]
    pub fn is_settled(&self) -> bool {
        !matches!(self, ModelStatus::Pending)
    }
}

/// Consumer-side view of an inference stream.
///
/// Feed it every event with [`apply`](Self::apply); rank at any point with
/// [`rank`](Self::rank). Failed models keep a result with `error` set so they are
/// visible but never ranked.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    candidates: Vec<ModelCandidate>,
    statuses: HashMap<String, ModelStatus>,
    results: HashMap<String, InferenceResult>,
    complete: bool,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector already primed with the candidate list.
    pub fn with_candidates(candidates: Vec<ModelCandidate>) -> Self {
        let mut collector = Self::new();
        collector.reset(candidates);
        collector
    }

    pub fn apply(&mut self, event: &InferenceEvent) {
        match event {
            InferenceEvent::Models { models } => self.reset(models.clone()),
            InferenceEvent::Inference { model_id, result } => {
                if self.settle(model_id, ModelStatus::Succeeded) {
                    self.results.insert(model_id.clone(), result.clone());
                }
            }
            InferenceEvent::Error { model_id, error } => {
                if self.settle(model_id, ModelStatus::Failed(error.clone())) {
                    self.results
                        .insert(model_id.clone(), InferenceResult::failed(model_id, error));
                }
            }
            InferenceEvent::Complete => self.complete = true,
        }
    }

    fn reset(&mut self, candidates: Vec<ModelCandidate>) {
        self.statuses = candidates
            .iter()
            .map(|c| (c.id.clone(), ModelStatus::Pending))
            .collect();
        self.results.clear();
        self.candidates = candidates;
        self.complete = false;
    }

    fn settle(&mut self, model_id: &str, status: ModelStatus) -> bool {
        match self.statuses.get_mut(model_id) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => {
                warn!(model_id = model_id, "Event for unknown model ignored");
                false
            }
        }
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub fn status(&self, model_id: &str) -> Option<&ModelStatus> {
        self.statuses.get(model_id)
    }

    pub fn result(&self, model_id: &str) -> Option<&InferenceResult> {
        self.results.get(model_id)
    }

    pub fn results(&self) -> &HashMap<String, InferenceResult> {
        &self.results
    }

    pub fn pending_count(&self) -> usize {
        self.count(|s| matches!(s, ModelStatus::Pending))
    }

    pub fn succeeded_count(&self) -> usize {
        self.count(|s| matches!(s, ModelStatus::Succeeded))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, ModelStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ModelStatus) -> bool) -> usize {
        self.statuses.values().filter(|s| pred(s)).count()
    }

    /// `true` once the stream's `complete` event has been applied.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Ranks the successful results received so far.
    pub fn rank(&self, engine: &RankingEngine, query: &RankingQuery) -> Vec<RankedCandidate> {
        engine.rank(&self.candidates, &self.results, query)
    }
}
