//! Approximate string matching for metadata scoring.

/// Fuzzy text comparison. Distances are normalised to `[0, 1]`, `0` being exact.
///
/// Both inputs are expected to be normalised with [`normalize`] already.
pub trait ApproximateStringMatcher: Send + Sync {
    fn distance(&self, query: &str, text: &str) -> f64;
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Damerau-Levenshtein matcher backed by `strsim`.
///
/// The distance is the minimum over the whole text and every run of consecutive
/// words as long as the query, so `"hat"` matches `"hard hat detector"` well. A
/// query contained verbatim in the text has distance `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamerauMatcher;

impl DamerauMatcher {
    fn raw_distance(a: &str, b: &str) -> f64 {
        (1.0 - strsim::normalized_damerau_levenshtein(a, b)).clamp(0.0, 1.0)
    }
}

impl ApproximateStringMatcher for DamerauMatcher {
    fn distance(&self, query: &str, text: &str) -> f64 {
        if query.is_empty() || text.is_empty() {
            return 1.0;
        }
        if text.contains(query) {
            return 0.0;
        }

        let mut best = Self::raw_distance(query, text);

        let words: Vec<&str> = text.split(' ').collect();
        let window = query.split(' ').count();
        if window < words.len() {
            for run in words.windows(window) {
                best = best.min(Self::raw_distance(query, &run.join(" ")));
                if best == 0.0 {
                    break;
                }
            }
        }

        best
    }
}
