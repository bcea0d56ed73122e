//! Per-session loop state.

use crate::conversation::scheduler::TurnScheduler;
use crate::core::ids::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one session's control loop.
///
/// `Init -> Running <-> Paused -> Stopped`; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Init,
    Running,
    Paused,
    Stopped,
}

/// A turn that was cut short by pause/stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interruption {
    pub participant: ParticipantId,
    pub at: DateTime<Utc>,
}

/// State of one running conversation.
///
/// Owned by the session's loop; control calls only flip the lifecycle
/// flags and, on resume, re-point the scheduler.
#[derive(Debug, Clone)]
pub struct ConversationState {
    running: bool,
    phase: LoopPhase,
    scheduler: TurnScheduler,
    message_count: u64,
    last_generated_by: Option<ParticipantId>,
    interruption: Option<Interruption>,
}

impl ConversationState {
    pub fn new(queue: Vec<ParticipantId>) -> Self {
        Self {
            running: false,
            phase: LoopPhase::Init,
            scheduler: TurnScheduler::new(queue),
            message_count: 0,
            last_generated_by: None,
            interruption: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TurnScheduler {
        &mut self.scheduler
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    pub fn last_generated_by(&self) -> Option<&ParticipantId> {
        self.last_generated_by.as_ref()
    }

    pub fn interruption(&self) -> Option<&Interruption> {
        self.interruption.as_ref()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interruption.is_some()
    }

    pub fn mark_running(&mut self) {
        self.running = true;
        self.phase = LoopPhase::Running;
    }

    pub fn mark_paused(&mut self) {
        self.running = false;
        self.phase = LoopPhase::Paused;
    }

    pub fn mark_stopped(&mut self) {
        self.running = false;
        self.phase = LoopPhase::Stopped;
    }

    /// Record a completed turn. Does not touch the rotation index.
    pub fn record_turn(&mut self, participant: ParticipantId) {
        self.message_count += 1;
        self.last_generated_by = Some(participant);
    }

    /// Record that `participant` was cut off mid-turn.
    pub fn record_interruption(&mut self, participant: ParticipantId, at: DateTime<Utc>) {
        self.interruption = Some(Interruption { participant, at });
    }

    /// Clear the interruption and give its participant the next turn.
    ///
    /// Returns the interruption that was cleared, if any.
    pub fn resume_interrupted(&mut self) -> Option<Interruption> {
        let interruption = self.interruption.take()?;
        self.scheduler.focus(&interruption.participant);
        Some(interruption)
    }

    pub fn stats(&self, generating: bool) -> ConversationStats {
        ConversationStats {
            running: self.running,
            phase: self.phase,
            generating,
            message_count: self.message_count,
            current_participant: self.scheduler.current().cloned(),
            last_generated_by: self.last_generated_by.clone(),
            interrupted: self.interruption.is_some(),
            interrupted_participant: self
                .interruption
                .as_ref()
                .map(|i| i.participant.clone()),
        }
    }
}

/// Why a session's control loop returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum LoopExit {
    /// The cancellation token fired between turns
    Cancelled,
    /// The token fired while `participant` was generating
    Interrupted { participant: ParticipantId },
    /// Fewer than two eligible participants remain
    InsufficientParticipants { eligible: usize },
    /// The store no longer knows the session
    SessionNotFound,
}

impl LoopExit {
    /// True for exits the loop decides on its own, as opposed to pause/stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopExit::InsufficientParticipants { .. } | LoopExit::SessionNotFound
        )
    }
}

impl std::fmt::Display for LoopExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopExit::Cancelled => write!(f, "cancelled"),
            LoopExit::Interrupted { participant } => {
                write!(f, "interrupted during {participant}'s turn")
            }
            LoopExit::InsufficientParticipants { eligible } => {
                write!(f, "only {eligible} eligible participant(s) left")
            }
            LoopExit::SessionNotFound => write!(f, "session no longer exists"),
        }
    }
}

/// Read-only view returned by the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub running: bool,
    pub phase: LoopPhase,
    pub generating: bool,
    pub message_count: u64,
    pub current_participant: Option<ParticipantId>,
    pub last_generated_by: Option<ParticipantId>,
    pub interrupted: bool,
    pub interrupted_participant: Option<ParticipantId>,
}
