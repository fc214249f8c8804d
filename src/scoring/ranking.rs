use std::collections::HashMap;

use tracing::debug;

use super::error::ScoringError;
use super::metadata::{MetadataScorer, MetadataScorerConfig};
use super::overlap::OverlapScorer;
use super::types::{RankedCandidate, RankingQuery, ScoreComponents};
use crate::config::Config;
use crate::model::{InferenceResult, ModelCandidate};

/// Combines every signal into one ordered ranking.
#[derive(Debug)]
pub struct RankingEngine {
    metadata: MetadataScorer,
}

impl RankingEngine {
    pub fn new(metadata: MetadataScorer) -> Self {
        Self { metadata }
    }

    pub fn with_config(config: MetadataScorerConfig) -> Result<Self, ScoringError> {
        Ok(Self::new(MetadataScorer::new(config)?))
    }

    pub fn from_config(config: &Config) -> Result<Self, ScoringError> {
        Self::with_config(config.metadata_config())
    }

    pub fn metadata_scorer(&self) -> &MetadataScorer {
        &self.metadata
    }

    /// Ranks every candidate that has a successful result, best first.
    ///
    /// Candidates without a result, or whose result carries an error, are left out.
    /// Ties keep candidate order.
    pub fn rank(
        &self,
        candidates: &[ModelCandidate],
        results: &HashMap<String, InferenceResult>,
        query: &RankingQuery,
    ) -> Vec<RankedCandidate> {
        let overlap = OverlapScorer::new(query.confidence_threshold);

        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .filter_map(|candidate| {
                let result = results.get(&candidate.id).filter(|r| r.is_success())?;
                let components = self.components(&overlap, candidate, result, query);
                Some(RankedCandidate {
                    model_id: candidate.id.clone(),
                    final_score: components.final_score(),
                    rank: 0,
                    is_best_match: false,
                    components,
                })
            })
            .collect();

        // Vec::sort_by is stable
        ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

        for (rank, candidate) in ranked.iter_mut().enumerate() {
            candidate.rank = rank;
            candidate.is_best_match = rank == 0;
        }

        debug!(
            candidates = candidates.len(),
            ranked = ranked.len(),
            best = ranked.first().map(|r| r.model_id.as_str()),
            "Ranking computed"
        );

        ranked
    }

    /// Signals for one candidate against its successful result.
    pub fn components(
        &self,
        overlap: &OverlapScorer,
        candidate: &ModelCandidate,
        result: &InferenceResult,
        query: &RankingQuery,
    ) -> ScoreComponents {
        let transform = query
            .frame
            .transform_for(f64::from(result.image_width), f64::from(result.image_height));

        ScoreComponents {
            predictions_score: overlap.score(&query.drawn_boxes, &result.predictions, &transform),
            metadata_score: self.metadata.score_signal(candidate, &query.target_classes),
            semantic_score: candidate.semantic_score,
            image_similarity_score: candidate.image_similarity_score,
        }
    }
}
