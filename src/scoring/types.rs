use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, PENALTY_IMAGE_SIMILARITY, PENALTY_METADATA, PENALTY_PREDICTIONS,
    PENALTY_SEMANTIC, WEIGHT_IMAGE_SIMILARITY, WEIGHT_METADATA, WEIGHT_PREDICTIONS,
    WEIGHT_SEMANTIC, clamp_score,
};
use crate::model::{DrawnBox, ImageFrame};

/// Per-signal scores for one candidate.
///
/// `None` means the signal is unavailable, which is not the same as a zero score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub predictions_score: Option<f64>,
    pub metadata_score: Option<f64>,
    pub semantic_score: Option<f64>,
    pub image_similarity_score: Option<f64>,
}

impl ScoreComponents {
    /// Presence-aware weighted mean, clamped to `[0, 100]`.
    ///
    /// A present signal adds `weight * value` to the numerator and `weight` to the
    /// denominator. An absent one only adds its penalty weight to the denominator.
    pub fn final_score(&self) -> f64 {
        let signals = [
            (self.predictions_score, WEIGHT_PREDICTIONS, PENALTY_PREDICTIONS),
            (self.semantic_score, WEIGHT_SEMANTIC, PENALTY_SEMANTIC),
            (self.image_similarity_score, WEIGHT_IMAGE_SIMILARITY, PENALTY_IMAGE_SIMILARITY),
            (self.metadata_score, WEIGHT_METADATA, PENALTY_METADATA),
        ];

        let (numerator, denominator) =
            signals
                .iter()
                .fold((0.0, 0.0), |(num, den), (value, weight, penalty)| match value {
                    Some(v) => (num + weight * clamp_score(*v), den + weight),
                    None => (num, den + penalty),
                });

        if denominator <= 0.0 {
            return 0.0;
        }
        clamp_score(numerator / denominator)
    }

    /// Number of signals that are present.
    pub fn present_count(&self) -> usize {
        [
            self.predictions_score,
            self.metadata_score,
            self.semantic_score,
            self.image_similarity_score,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }
}

/// A ranked candidate. Recomputed on every ranking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub model_id: String,
    pub final_score: f64,
    /// 0-based position after sorting.
    pub rank: usize,
    pub is_best_match: bool,
    pub components: ScoreComponents,
}

/// What the user asked for: drawn boxes, how the image is displayed, and target classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQuery {
    #[serde(default)]
    pub drawn_boxes: Vec<DrawnBox>,
    pub frame: ImageFrame,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub target_classes: Vec<String>,
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl RankingQuery {
    pub fn new(frame: ImageFrame) -> Self {
        Self {
            drawn_boxes: Vec::new(),
            frame,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            target_classes: Vec::new(),
        }
    }

    pub fn with_drawn_boxes(mut self, boxes: Vec<DrawnBox>) -> Self {
        self.drawn_boxes = boxes;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_target_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_classes = classes.into_iter().map(Into::into).collect();
        self
    }
}
