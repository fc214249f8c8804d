//! Candidate scoring and ranking.
//!
//! Four signals feed the final score:
//! - **predictions**: overlap between drawn boxes and a model's predictions ([`OverlapScorer`])
//! - **metadata**: fuzzy match of target classes against the candidate's histogram,
//!   name and description ([`MetadataScorer`])
//! - **semantic** and **image similarity**: supplied by the candidate provider
//!
//! [`RankingEngine`] combines them with presence-aware weights: a missing signal
//! only adds a small penalty weight to the denominator, so it neither counts as zero
//! nor as a perfect score.

pub mod error;
pub mod matcher;
pub mod metadata;
pub mod overlap;
pub mod ranking;
pub mod types;


pub use error::ScoringError;
pub use matcher::{ApproximateStringMatcher, DamerauMatcher, normalize};
pub use metadata::{MatchIndex, MetadataScorer, MetadataScorerConfig};
pub use overlap::OverlapScorer;
pub use ranking::RankingEngine;
pub use types::{RankedCandidate, RankingQuery, ScoreComponents};
