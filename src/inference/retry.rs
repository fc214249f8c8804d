use std::time::Duration;

use rand::Rng;

use crate::constants::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_JITTER};

/// Exponential backoff with uniform jitter.
///
/// The delay after failed attempt `i` (0-based) is `initial_backoff * 2^i + U(0, max_jitter)`.
/// With the defaults that is roughly 1s, 2s, 4s, 8s between five attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// A policy with no jitter, for deterministic timing.
    pub fn fixed(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_jitter: Duration::ZERO,
        }
    }

    #[inline]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Deterministic part of the delay after failed attempt `attempt` (0-based).
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Full delay including a fresh jitter sample.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay(attempt).saturating_add(self.sample_jitter())
    }

    fn sample_jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis().min(u64::MAX as u128) as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(0), Duration::from_millis(1000));
        assert_eq!(policy.base_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.base_delay(2), Duration::from_millis(4000));
        assert_eq!(policy.base_delay(3), Duration::from_millis(8000));
    }

    #[test]
    fn test_base_delay_saturates() {
        let policy = RetryPolicy::default();
        assert!(policy.base_delay(64) >= policy.base_delay(31));
    }

    #[test]
    fn test_jitter_within_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 0..4 {
            for _ in 0..50 {
                let delay = policy.delay_for(attempt);
                let base = policy.base_delay(attempt);
                assert!(delay >= base);
                assert!(delay <= base + Duration::from_millis(1000));
            }
        }
    }

    #[test]
    fn test_fixed_policy_has_no_jitter() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(5));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
    }

    #[test]
    fn test_zero_attempts_behaves_as_one() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO).attempts(), 1);
    }
}
