//! Per-session runtime handle shared by the loop and the control surface.

use crate::use_cases::concurrency_guard::ConcurrencyGuard;
use crate::use_cases::interruption::InterruptionManager;
use colloquy_domain::{ConversationState, ConversationStats, LoopExit, ParticipantId, SessionId};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Mutable state guarded together so lifecycle flips and token swaps are
/// observed atomically.
#[derive(Debug)]
pub struct RuntimeInner {
    pub state: ConversationState,
    pub interruption: InterruptionManager,
}

/// One registered session.
///
/// `inner` is a std mutex and is never held across an await. `control`
/// serializes pause/resume/stop for this session and holds the loop task.
#[derive(Debug)]
pub struct SessionRuntime {
    id: SessionId,
    inner: Mutex<RuntimeInner>,
    guard: ConcurrencyGuard,
    pub(crate) control: tokio::sync::Mutex<Option<JoinHandle<LoopExit>>>,
}

impl SessionRuntime {
    pub fn new(id: SessionId, queue: Vec<ParticipantId>) -> Self {
        Self {
            id,
            inner: Mutex::new(RuntimeInner {
                state: ConversationState::new(queue),
                interruption: InterruptionManager::new(),
            }),
            guard: ConcurrencyGuard::new(),
            control: tokio::sync::Mutex::new(None),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    pub fn lock(&self) -> MutexGuard<'_, RuntimeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the state locked
    pub fn with_state<R>(&self, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        f(&mut self.lock().state)
    }

    pub fn is_running(&self) -> bool {
        self.lock().state.is_running()
    }

    pub fn stats(&self) -> ConversationStats {
        let generating = self.guard.is_generating();
        self.lock().state.stats(generating)
    }
}
