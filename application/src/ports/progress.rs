//! Progress notification port
//!
//! Defines the callbacks the conversation loop fires as turns happen.

use colloquy_domain::{LoopExit, Participant, ParticipantId, SessionId, SkipReason};

/// Callback for turn-level updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ConversationProgress: Send + Sync {
    /// Called when a participant is admitted and starts generating
    fn on_turn_start(&self, _session: &SessionId, _participant: &Participant) {}

    /// Called after the message has been appended to the transcript
    fn on_turn_complete(&self, _session: &SessionId, _participant: &Participant, _content: &str) {}

    /// Called when a turn failed for good and the participant went to `error`
    fn on_turn_failed(&self, _session: &SessionId, _participant: &Participant, _error: &str) {}

    fn on_turn_skipped(
        &self,
        _session: &SessionId,
        _participant: &ParticipantId,
        _reason: SkipReason,
    ) {
    }

    /// Called when pause/stop cut a turn short
    fn on_interrupted(&self, _session: &SessionId, _participant: &ParticipantId) {}

    fn on_loop_exit(&self, _session: &SessionId, _exit: &LoopExit) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ConversationProgress for NoProgress {}
