//! Interruption manager
//!
//! Owns a session's cancellation token. Pause and stop fire it; resume
//! swaps in a fresh one and hands the interrupted participant the next
//! turn.

use chrono::{DateTime, Utc};
use colloquy_domain::{ConversationState, Interruption, LoopPhase, ParticipantId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct InterruptionManager {
    token: CancellationToken,
}

impl InterruptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the current run of the loop
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fire the current token. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Swap in a fresh token; holders of the old one stay cancelled.
    pub fn renew(&mut self) -> CancellationToken {
        self.token = CancellationToken::new();
        self.token.clone()
    }

    /// Clear a recorded interruption and move its participant to the front.
    pub fn take_resume_target(&self, state: &mut ConversationState) -> Option<Interruption> {
        let interruption = state.resume_interrupted();
        if let Some(i) = &interruption {
            info!("Resuming with interrupted participant {} first", i.participant);
        }
        interruption
    }

    /// Fire the token and mark the state paused.
    ///
    /// Only a running conversation can be paused; returns false otherwise.
    pub fn pause(&self, state: &mut ConversationState) -> bool {
        if state.phase() != LoopPhase::Running {
            return false;
        }
        self.trigger();
        state.mark_paused();
        true
    }

    /// Fire the token and mark the state stopped.
    pub fn stop(&self, state: &mut ConversationState) {
        self.trigger();
        state.mark_stopped();
    }

    /// Replace the token and mark the state running.
    ///
    /// Only a paused conversation can be resumed; returns `None` when the
    /// state was not paused. Otherwise returns the interruption that was
    /// cleared, whose participant now holds the current index.
    pub fn resume(&mut self, state: &mut ConversationState) -> Option<Option<Interruption>> {
        if state.phase() != LoopPhase::Paused {
            return None;
        }
        self.renew();
        state.mark_running();
        Some(self.take_resume_target(state))
    }

    /// Record that `participant` was cut off mid-turn.
    pub fn record_abort(
        &self,
        state: &mut ConversationState,
        participant: ParticipantId,
        at: DateTime<Utc>,
    ) {
        debug!("Turn of {} interrupted", participant);
        state.record_interruption(participant, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> ConversationState {
        let mut state = ConversationState::new(vec!["a".into(), "b".into(), "c".into()]);
        state.mark_running();
        state
    }

    #[test]
    fn test_pause_fires_token() {
        let manager = InterruptionManager::new();
        let token = manager.token();
        let mut state = running_state();
        assert!(manager.pause(&mut state));
        assert!(token.is_cancelled());
        assert!(manager.is_triggered());
        assert_eq!(state.phase(), LoopPhase::Paused);
    }

    #[test]
    fn test_pause_twice_is_noop() {
        let manager = InterruptionManager::new();
        let mut state = running_state();
        assert!(manager.pause(&mut state));
        assert!(!manager.pause(&mut state));
        assert_eq!(state.phase(), LoopPhase::Paused);
    }

    #[test]
    fn test_resume_renews_token() {
        let mut manager = InterruptionManager::new();
        let mut state = running_state();
        let old = manager.token();
        manager.pause(&mut state);
        assert_eq!(manager.resume(&mut state), Some(None));
        assert!(old.is_cancelled());
        assert!(!manager.token().is_cancelled());
        assert!(state.is_running());
    }

    #[test]
    fn test_resume_when_running_is_noop() {
        let mut manager = InterruptionManager::new();
        let mut state = running_state();
        let token = manager.token();
        assert_eq!(manager.resume(&mut state), None);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_resume_gives_interrupted_participant_priority() {
        let mut manager = InterruptionManager::new();
        let mut state = running_state();
        state.scheduler_mut().advance(); // b
        manager.record_abort(&mut state, "b".into(), Utc::now());
        manager.pause(&mut state);
        state.scheduler_mut().advance(); // c

        let cleared = manager.resume(&mut state).flatten().unwrap();
        assert_eq!(cleared.participant.as_str(), "b");
        assert_eq!(state.scheduler().current().unwrap().as_str(), "b");
        assert!(!state.is_interrupted());
    }

    #[test]
    fn test_renew_leaves_old_token_cancelled() {
        let mut manager = InterruptionManager::new();
        let old = manager.token();
        manager.trigger();
        let fresh = manager.renew();
        assert!(old.is_cancelled());
        assert!(!fresh.is_cancelled());
        assert!(!manager.is_triggered());
    }

    #[test]
    fn test_stop_from_paused() {
        let manager = InterruptionManager::new();
        let mut state = running_state();
        manager.pause(&mut state);
        manager.stop(&mut state);
        assert_eq!(state.phase(), LoopPhase::Stopped);
        assert!(!state.is_running());
    }
}
