//! Cross-cutting, shared constants.
//!
//! Scoring weights live here so the ranking formula and its tests agree on a single
//! source of truth.
//!
//! # Weight Invariants
//!
//! Every score component is expressed on a `0..=100` scale. The aggregation in
//! [`crate::scoring::ScoreComponents::final_score`] divides by a denominator that is
//! always at least the sum of the penalty weights, so it can never be zero.

use std::time::Duration;

/// Default minimum prediction confidence considered by the overlap scorer.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Default number of attempts per inference call (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base delay used for exponential backoff.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Default upper bound for the uniform jitter added to every backoff delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(1000);

/// Default inference host. The request endpoint is `{url}/{candidate_id}`.
pub const DEFAULT_INFERENCE_URL: &str = "https://detect.roboflow.com";

/// Distances above this are treated as "no match" by the metadata scorer.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Default number of prepared candidate corpora kept by the metadata scorer.
pub const DEFAULT_MATCH_CACHE_CAPACITY: u64 = 1024;

/// Weight applied to a present overlap score.
pub const WEIGHT_PREDICTIONS: f64 = 0.5;
/// Weight applied to a present semantic score.
pub const WEIGHT_SEMANTIC: f64 = 0.2;
/// Weight applied to a present image similarity score.
pub const WEIGHT_IMAGE_SIMILARITY: f64 = 0.2;
/// Weight applied to a present metadata score.
pub const WEIGHT_METADATA: f64 = 0.1;

/// Denominator-only weight when the overlap score is unavailable.
pub const PENALTY_PREDICTIONS: f64 = 0.5;
/// Denominator-only weight when the semantic score is unavailable.
pub const PENALTY_SEMANTIC: f64 = 0.02;
/// Denominator-only weight when the image similarity score is unavailable.
pub const PENALTY_IMAGE_SIMILARITY: f64 = 0.02;
/// Denominator-only weight when the metadata score is unavailable.
pub const PENALTY_METADATA: f64 = 0.05;

/// Metadata contribution multiplier for class histogram matches.
pub const HISTOGRAM_MATCH_WEIGHT: f64 = 0.7;
/// Metadata contribution multiplier for model name matches.
pub const NAME_MATCH_WEIGHT: f64 = 0.3;
/// Metadata contribution multiplier for model description matches.
pub const DESCRIPTION_MATCH_WEIGHT: f64 = 0.2;

/// Histogram counts are divided by this before being added to the base weight of 1.0.
pub const HISTOGRAM_COUNT_DIVISOR: f64 = 10_000.0;
/// Upper bound of the histogram count weight.
pub const MAX_HISTOGRAM_COUNT_WEIGHT: f64 = 2.0;

/// Upper bound of every score on the `0..=100` scale.
pub const MAX_SCORE: f64 = 100.0;

/// Clamps `value` into `0..=100`, mapping NaN to 0.
#[inline]
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_SCORE)
}
