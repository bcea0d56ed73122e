//! Engine parameters: conversation loop control.
//!
//! [`EngineConfig`] groups the static parameters that control every
//! session's loop in
//! [`ConversationManager`](crate::use_cases::conversation_manager::ConversationManager).
//! The policies themselves are domain types; the sleeps and grace periods
//! below are application-layer concerns.

use colloquy_domain::conversation::window::DEFAULT_CONTEXT_MESSAGES;
use colloquy_domain::{PacingPolicy, RetryPolicy, SchedulerPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sleeps used by the loop outside of pacing and backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopTimings {
    /// Wait when the concurrency guard is already held
    pub guard_busy_ms: u64,
    /// Poll interval while the store reports the session paused/completed
    pub external_pause_poll_ms: u64,
    /// Wait after a failed store read before trying again
    pub store_retry_ms: u64,
    /// How long pause/stop wait for an in-flight turn to observe cancellation
    pub stop_grace_ms: u64,
}

impl Default for LoopTimings {
    fn default() -> Self {
        Self {
            guard_busy_ms: 750,
            external_pause_poll_ms: 1_000,
            store_retry_ms: 1_000,
            stop_grace_ms: 1_000,
        }
    }
}

impl LoopTimings {
    pub fn guard_busy(&self) -> Duration {
        Duration::from_millis(self.guard_busy_ms)
    }

    pub fn external_pause_poll(&self) -> Duration {
        Duration::from_millis(self.external_pause_poll_ms)
    }

    pub fn store_retry(&self) -> Duration {
        Duration::from_millis(self.store_retry_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

/// Everything a session loop needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
    pub scheduler: SchedulerPolicy,
    pub pacing: PacingPolicy,
    pub timings: LoopTimings,
    /// Number of recent transcript messages handed to a provider
    pub context_messages: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            scheduler: SchedulerPolicy::default(),
            pacing: PacingPolicy::default(),
            timings: LoopTimings::default(),
            context_messages: DEFAULT_CONTEXT_MESSAGES,
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerPolicy) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_timings(mut self, timings: LoopTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_context_messages(mut self, count: usize) -> Self {
        self.context_messages = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.scheduler.self_reply_cooldown_ms, 2_000);
        assert_eq!(config.scheduler.error_cooldown_ms, 3_000);
        assert_eq!(config.pacing.min_delay_ms, 3_000);
        assert_eq!(config.context_messages, 20);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_context_messages(5)
            .with_timings(LoopTimings {
                stop_grace_ms: 10,
                ..LoopTimings::default()
            });
        assert_eq!(config.context_messages, 5);
        assert_eq!(config.timings.stop_grace(), Duration::from_millis(10));
    }
}
