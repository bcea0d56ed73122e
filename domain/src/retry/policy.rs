//! Retry budget and backoff calculation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Exponential backoff without jitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before attempt `attempt` (1-based).
    ///
    /// Attempt 1 runs immediately; attempt `k >= 2` waits
    /// `min(base * 2^(k-2), max)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(31);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }

    /// Every backoff wait the policy allows, in order.
    pub fn delays(&self) -> Vec<Duration> {
        (2..=self.max_attempts())
            .map(|attempt| self.delay_for_attempt(attempt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_backoff_sequence() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = policy.delays().iter().map(|d| d.as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000]);
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(8_000));
        assert_eq!(policy.delay_for_attempt(12), Duration::from_millis(8_000));
    }

    #[test]
    fn test_first_attempt_has_no_delay() {
        assert_eq!(RetryPolicy::default().delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = RetryPolicy {
            max_delay_ms: u64::MAX,
            ..RetryPolicy::default()
        };
        assert!(policy.delay_for_attempt(200) > Duration::ZERO);
    }
}
