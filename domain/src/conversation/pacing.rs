//! Inter-turn pacing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default base delay between turns.
pub const DEFAULT_TURN_DELAY_MS: u64 = 3_000;
/// Lower bound for any inter-turn delay.
pub const MIN_TURN_DELAY_MS: u64 = 3_000;

/// Delay between turns: `base * multiplier(provider)`, never below the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingPolicy {
    pub base_delay_ms: u64,
    pub min_delay_ms: u64,
    /// Per-backend multiplier keyed by provider name; missing means 1.0
    pub multipliers: HashMap<String, f64>,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_TURN_DELAY_MS,
            min_delay_ms: MIN_TURN_DELAY_MS,
            multipliers: HashMap::new(),
        }
    }
}

impl PacingPolicy {
    pub fn with_multiplier(mut self, provider: impl Into<String>, multiplier: f64) -> Self {
        self.multipliers.insert(provider.into(), multiplier);
        self
    }

    pub fn multiplier(&self, provider: &str) -> f64 {
        self.multipliers
            .get(provider)
            .copied()
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(1.0)
    }

    pub fn delay_for(&self, provider: &str) -> Duration {
        let scaled = (self.base_delay_ms as f64 * self.multiplier(provider)).round() as u64;
        Duration::from_millis(scaled.max(self.min_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay() {
        let policy = PacingPolicy::default();
        assert_eq!(policy.delay_for("anything"), Duration::from_millis(3_000));
    }

    #[test]
    fn test_multiplier_scales_delay() {
        let policy = PacingPolicy::default().with_multiplier("slow", 2.5);
        assert_eq!(policy.delay_for("slow"), Duration::from_millis(7_500));
    }

    #[test]
    fn test_floor_applies() {
        let policy = PacingPolicy::default().with_multiplier("fast", 0.1);
        assert_eq!(policy.delay_for("fast"), Duration::from_millis(3_000));
    }

    #[test]
    fn test_invalid_multiplier_ignored() {
        let policy = PacingPolicy::default().with_multiplier("bad", -1.0);
        assert_eq!(policy.multiplier("bad"), 1.0);
    }
}
