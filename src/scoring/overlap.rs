use tracing::trace;

use crate::constants::{DEFAULT_CONFIDENCE_THRESHOLD, MAX_SCORE, clamp_score};
use crate::model::{DrawnBox, FrameTransform, PredictedBox};

/// Scores how well a model's predictions cover the user's drawn boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapScorer {
    confidence_threshold: f64,
}

impl Default for OverlapScorer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl OverlapScorer {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Percentage of drawn area covered by the best-matching prediction per box.
    ///
    /// Returns `None` when nothing was drawn, and `Some(0.0)` when boxes exist but
    /// have no area or nothing overlaps. Drawn boxes are mapped into original-image
    /// space with `transform` first. Predictions below the confidence threshold are
    /// ignored.
    pub fn score(
        &self,
        drawn: &[DrawnBox],
        predictions: &[PredictedBox],
        transform: &FrameTransform,
    ) -> Option<f64> {
        if drawn.is_empty() {
            return None;
        }

        let confident: Vec<_> = predictions
            .iter()
            .filter(|p| p.confidence >= self.confidence_threshold)
            .map(PredictedBox::rect)
            .collect();

        let mut total_area = 0.0;
        let mut covered = 0.0;

        for drawn_box in drawn {
            let rect = transform.map_drawn(drawn_box);
            let area = rect.area();
            if area <= 0.0 {
                continue;
            }

            let best = confident
                .iter()
                .map(|p| rect.intersection_area(p))
                .fold(0.0_f64, f64::max);

            total_area += area;
            covered += best;
        }

        if total_area <= 0.0 {
            return Some(0.0);
        }

        let score = clamp_score((MAX_SCORE * covered / total_area).round());
        trace!(
            drawn = drawn.len(),
            confident = confident.len(),
            score = score,
            "Overlap scored"
        );
        Some(score)
    }
}
