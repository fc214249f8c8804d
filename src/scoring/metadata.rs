use std::sync::Arc;

use moka::sync::Cache;
use tracing::trace;

use super::error::ScoringError;
use super::matcher::{ApproximateStringMatcher, DamerauMatcher, normalize};
use crate::constants::{
    DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_MATCH_THRESHOLD, DESCRIPTION_MATCH_WEIGHT,
    HISTOGRAM_COUNT_DIVISOR, HISTOGRAM_MATCH_WEIGHT, MAX_HISTOGRAM_COUNT_WEIGHT, MAX_SCORE,
    NAME_MATCH_WEIGHT, clamp_score,
};
use crate::hashing::hash_corpus_key;
use crate::model::ModelCandidate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetadataScorerConfig {
    /// Distances above this count as no match.
    pub match_threshold: f64,
    /// Maximum number of cached [`MatchIndex`]es.
    pub cache_capacity: u64,
}

impl Default for MetadataScorerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            cache_capacity: DEFAULT_MATCH_CACHE_CAPACITY,
        }
    }
}

impl MetadataScorerConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ScoringError::ThresholdOutOfRange {
                name: "match_threshold",
                value: self.match_threshold,
            });
        }
        if self.cache_capacity == 0 {
            return Err(ScoringError::InvalidInput {
                reason: "cache_capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// A candidate's metadata, normalised once for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchIndex {
    classes: Vec<(String, u64)>,
    name: String,
    description: String,
}

impl MatchIndex {
    pub fn build(candidate: &ModelCandidate) -> Self {
        Self {
            classes: candidate
                .class_histogram
                .iter()
                .map(|c| (normalize(&c.name), c.count))
                .filter(|(name, _)| !name.is_empty())
                .collect(),
            name: normalize(&candidate.name),
            description: normalize(&candidate.description),
        }
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

/// Scores how well a candidate's metadata matches the target classes.
///
/// Owns a bounded cache of [`MatchIndex`]es keyed by a hash of the candidate's
/// metadata, so an edited candidate never reuses a stale index.
pub struct MetadataScorer {
    matcher: Arc<dyn ApproximateStringMatcher>,
    config: MetadataScorerConfig,
    indexes: Cache<u64, Arc<MatchIndex>>,
}

impl std::fmt::Debug for MetadataScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataScorer")
            .field("config", &self.config)
            .field("cached_indexes", &self.indexes.entry_count())
            .finish_non_exhaustive()
    }
}

impl MetadataScorer {
    pub fn new(config: MetadataScorerConfig) -> Result<Self, ScoringError> {
        Self::with_matcher(config, Arc::new(DamerauMatcher))
    }

    pub fn with_matcher(
        config: MetadataScorerConfig,
        matcher: Arc<dyn ApproximateStringMatcher>,
    ) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self {
            matcher,
            config,
            indexes: Cache::builder().max_capacity(config.cache_capacity).build(),
        })
    }

    pub fn config(&self) -> &MetadataScorerConfig {
        &self.config
    }

    /// Sum of histogram, name and description contributions over every target,
    /// clamped to `[0, 100]`. `0.0` for an empty target list.
    pub fn score(&self, candidate: &ModelCandidate, target_classes: &[String]) -> f64 {
        self.score_signal(candidate, target_classes).unwrap_or(0.0)
    }

    /// Like [`score`](Self::score), but `None` when there is nothing to match.
    pub fn score_signal(&self, candidate: &ModelCandidate, target_classes: &[String]) -> Option<f64> {
        let targets: Vec<String> = target_classes
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .collect();
        if targets.is_empty() {
            return None;
        }

        let index = self.index_for(candidate);
        let total: f64 = targets.iter().map(|t| self.target_score(&index, t)).sum();
        let score = clamp_score(total);

        trace!(
            model_id = %candidate.id,
            targets = targets.len(),
            score = score,
            "Metadata scored"
        );
        Some(score)
    }

    /// Cached [`MatchIndex`] for `candidate`, built on first use.
    pub fn index_for(&self, candidate: &ModelCandidate) -> Arc<MatchIndex> {
        self.indexes
            .get_with(hash_corpus_key(candidate), || Arc::new(MatchIndex::build(candidate)))
    }

    pub fn cached_indexes(&self) -> u64 {
        self.indexes.run_pending_tasks();
        self.indexes.entry_count()
    }

    fn target_score(&self, index: &MatchIndex, target: &str) -> f64 {
        let histogram = index
            .classes
            .iter()
            .map(|(name, count)| (self.matcher.distance(target, name), *count))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(0.0, |(distance, count)| {
                let count_weight =
                    (1.0 + count as f64 / HISTOGRAM_COUNT_DIVISOR).min(MAX_HISTOGRAM_COUNT_WEIGHT);
                self.match_score(distance) * HISTOGRAM_MATCH_WEIGHT * count_weight
            });

        let name = self.match_score(self.matcher.distance(target, &index.name)) * NAME_MATCH_WEIGHT;
        let description = self.match_score(self.matcher.distance(target, &index.description))
            * DESCRIPTION_MATCH_WEIGHT;

        histogram + name + description
    }

    fn match_score(&self, distance: f64) -> f64 {
        if distance > self.config.match_threshold {
            return 0.0;
        }
        (MAX_SCORE - distance * MAX_SCORE).max(0.0)
    }
}
