//! Turn rotation.
//!
//! The scheduler keeps the rotation queue (eligible participants in join
//! order) and the index of whoever speaks next. It never talks to the store;
//! the loop feeds it a fresh [`SessionSnapshot`] every iteration.

use crate::core::ids::ParticipantId;
use crate::participant::{Participant, ParticipantStatus};
use crate::session::SessionSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default window in which a participant may not answer its own message.
pub const DEFAULT_SELF_REPLY_COOLDOWN_MS: u64 = 2_000;
/// Default wait after skipping a participant in `error`.
pub const DEFAULT_ERROR_COOLDOWN_MS: u64 = 3_000;

/// Timing rules applied before a turn is admitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerPolicy {
    pub self_reply_cooldown_ms: u64,
    pub error_cooldown_ms: u64,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            self_reply_cooldown_ms: DEFAULT_SELF_REPLY_COOLDOWN_MS,
            error_cooldown_ms: DEFAULT_ERROR_COOLDOWN_MS,
        }
    }
}

impl SchedulerPolicy {
    pub fn self_reply_cooldown(&self) -> Duration {
        Duration::from_millis(self.self_reply_cooldown_ms)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_millis(self.error_cooldown_ms)
    }
}

/// Why a scheduled participant did not get the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The id no longer resolves to a participant in the session
    UnknownParticipant,
    /// The participant is in `error`; the loop waits out the error cooldown
    ErrorStatus,
    /// The participant wrote the last message within the self-reply cooldown
    SelfReplyCooldown,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnknownParticipant => "unknown_participant",
            SkipReason::ErrorStatus => "error_status",
            SkipReason::SelfReplyCooldown => "self_reply_cooldown",
        }
    }
}

/// Outcome of evaluating the participant at the current index
#[derive(Debug, Clone, PartialEq)]
pub enum TurnDecision {
    Speak(Participant),
    Skip {
        participant: ParticipantId,
        reason: SkipReason,
    },
}

/// Ordered participant rotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnScheduler {
    queue: Vec<ParticipantId>,
    current: usize,
}

impl TurnScheduler {
    pub fn new(queue: Vec<ParticipantId>) -> Self {
        Self { queue, current: 0 }
    }

    pub fn queue(&self) -> &[ParticipantId] {
        &self.queue
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&ParticipantId> {
        self.queue.get(self.current)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Rebuild the queue when the eligible set changed.
    ///
    /// `eligible` must already be in join order. The current participant
    /// keeps the turn if still present; otherwise the index resets to 0.
    /// Returns true when the queue was rebuilt.
    pub fn resync(&mut self, eligible: &[ParticipantId]) -> bool {
        if self.queue == eligible {
            return false;
        }
        let previous = self.current().cloned();
        self.queue = eligible.to_vec();
        self.current = previous
            .and_then(|id| self.queue.iter().position(|q| *q == id))
            .unwrap_or(0);
        true
    }

    pub fn advance(&mut self) {
        if !self.queue.is_empty() {
            self.current = (self.current + 1) % self.queue.len();
        }
    }

    /// Point the index at `id`. Returns false if `id` is not queued.
    pub fn focus(&mut self, id: &ParticipantId) -> bool {
        match self.queue.iter().position(|q| q == id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Apply the skip policies to the participant at the current index.
    ///
    /// Returns `None` when the queue is empty.
    pub fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        now: DateTime<Utc>,
        policy: &SchedulerPolicy,
    ) -> Option<TurnDecision> {
        let id = self.current()?.clone();

        let Some(participant) = snapshot.participant(&id) else {
            return Some(TurnDecision::Skip {
                participant: id,
                reason: SkipReason::UnknownParticipant,
            });
        };

        if participant.status == ParticipantStatus::Error {
            return Some(TurnDecision::Skip {
                participant: id,
                reason: SkipReason::ErrorStatus,
            });
        }

        if let Some(last) = snapshot.last_message()
            && last.is_from(&id)
        {
            let elapsed = now
                .signed_duration_since(last.created_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if elapsed < policy.self_reply_cooldown() {
                return Some(TurnDecision::Skip {
                    participant: id,
                    reason: SkipReason::SelfReplyCooldown,
                });
            }
        }

        Some(TurnDecision::Speak(participant.clone()))
    }
}
