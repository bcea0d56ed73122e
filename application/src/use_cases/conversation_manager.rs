//! Conversation manager
//!
//! Registry of running sessions and the control surface exposed to hosts
//! (CLI, API layer): start, pause, resume, stop, is_active and stats.
//! At most one [`SessionRuntime`] exists per session id.

use crate::config::EngineConfig;
use crate::ports::error_sink::ErrorSink;
use crate::ports::progress::{ConversationProgress, NoProgress};
use crate::ports::provider_gateway::ProviderGateway;
use crate::ports::session_store::{SessionStore, StoreError};
use crate::use_cases::retry_executor::RetryExecutor;
use crate::use_cases::run_conversation::{ConversationLoop, LoopDeps};
use crate::use_cases::session_runtime::{RuntimeInner, SessionRuntime};
use colloquy_domain::{
    ConversationStats, LoopExit, LoopPhase, MessageAuthor, ParticipantStatus, SessionId,
    SessionStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors returned by the control surface
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("At least two eligible participants are required, found {found}")]
    InsufficientParticipants { found: usize },

    #[error("Conversation already active for session {0}")]
    AlreadyActive(SessionId),

    #[error("No conversation registered for session {0}")]
    NotFound(SessionId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns every session's loop and its runtime handle
pub struct ConversationManager {
    deps: LoopDeps,
    sessions: Mutex<HashMap<SessionId, Arc<SessionRuntime>>>,
}

impl ConversationManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn ProviderGateway>,
        sink: Arc<dyn ErrorSink>,
        config: EngineConfig,
    ) -> Self {
        let executor = Arc::new(RetryExecutor::new(config.retry.clone(), sink));
        Self {
            deps: LoopDeps {
                store,
                gateway,
                executor,
                config: Arc::new(config),
                progress: Arc::new(NoProgress),
            },
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a progress notifier for turn-level callbacks
    pub fn with_progress(mut self, progress: Arc<dyn ConversationProgress>) -> Self {
        self.deps.progress = progress;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.deps.config
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<SessionRuntime>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn runtime(&self, id: &SessionId) -> Option<Arc<SessionRuntime>> {
        self.sessions().get(id).cloned()
    }

    /// Begin a conversation.
    ///
    /// Fails without registering anything if fewer than two eligible
    /// participants exist. An `initial_prompt` is appended to the
    /// transcript as a user message before the first turn.
    pub async fn start(
        &self,
        id: &SessionId,
        initial_prompt: Option<&str>,
    ) -> Result<(), ConversationError> {
        let snapshot = self.deps.store.get_session(id).await?;
        let eligible = snapshot.eligible_ids();
        if eligible.len() < 2 {
            return Err(ConversationError::InsufficientParticipants {
                found: eligible.len(),
            });
        }

        let runtime = {
            let mut sessions = self.sessions();
            if let Some(existing) = sessions.get(id)
                && existing.with_state(|s| s.phase()) != LoopPhase::Stopped
            {
                return Err(ConversationError::AlreadyActive(id.clone()));
            }
            let runtime = Arc::new(SessionRuntime::new(id.clone(), eligible));
            sessions.insert(id.clone(), Arc::clone(&runtime));
            runtime
        };

        if let Err(e) = self.prepare_session(id, initial_prompt).await {
            self.sessions().remove(id);
            return Err(e);
        }

        let mut control = runtime.control.lock().await;
        runtime.with_state(|state| state.mark_running());
        *control = Some(self.spawn_loop(&runtime));

        info!("Conversation started for session {}", id);
        Ok(())
    }

    async fn prepare_session(
        &self,
        id: &SessionId,
        initial_prompt: Option<&str>,
    ) -> Result<(), ConversationError> {
        if let Some(prompt) = initial_prompt.filter(|p| !p.trim().is_empty()) {
            self.deps
                .store
                .append_message(id, MessageAuthor::User, prompt)
                .await?;
        }
        self.deps
            .store
            .set_session_status(id, SessionStatus::Active)
            .await?;
        Ok(())
    }

    /// Cut the current turn short and stop taking new ones. Idempotent.
    pub async fn pause(&self, id: &SessionId) -> Result<(), ConversationError> {
        let runtime = self
            .runtime(id)
            .ok_or_else(|| ConversationError::NotFound(id.clone()))?;
        let mut control = runtime.control.lock().await;

        let paused = {
            let mut inner = runtime.lock();
            let RuntimeInner {
                state,
                interruption,
            } = &mut *inner;
            interruption.pause(state)
        };
        if !paused {
            debug!("Pause ignored for session {}: not running", id);
            return Ok(());
        }

        if let Err(e) = self
            .deps
            .store
            .set_session_status(id, SessionStatus::Paused)
            .await
        {
            warn!("Failed to mark session {} paused: {}", id, e);
        }

        if let Some(handle) = control.take()
            && let Some(handle) = self.await_exit(id, handle).await
        {
            // still finishing its last call; resume and stop wait for it again
            *control = Some(handle);
        }

        info!("Conversation paused for session {}", id);
        Ok(())
    }

    /// Continue a paused conversation. An interrupted participant speaks
    /// first. No-op unless paused.
    pub async fn resume(&self, id: &SessionId) -> Result<(), ConversationError> {
        let runtime = self
            .runtime(id)
            .ok_or_else(|| ConversationError::NotFound(id.clone()))?;
        let mut control = runtime.control.lock().await;

        if runtime.with_state(|s| s.phase()) != LoopPhase::Paused {
            debug!("Resume ignored for session {}: not paused", id);
            return Ok(());
        }

        // the previous loop observed its own token; make sure it is gone
        if let Some(handle) = control.take()
            && let Some(handle) = self.await_exit(id, handle).await
        {
            handle.abort();
        }
        runtime.guard().force_release();

        self.deps
            .store
            .set_session_status(id, SessionStatus::Active)
            .await?;

        let resumed = {
            let mut inner = runtime.lock();
            let RuntimeInner {
                state,
                interruption,
            } = &mut *inner;
            interruption.resume(state)
        };
        if resumed.is_none() {
            return Ok(());
        }

        *control = Some(self.spawn_loop(&runtime));
        info!("Conversation resumed for session {}", id);
        Ok(())
    }

    /// Stop and unregister a conversation. Idempotent; unknown ids are a no-op.
    ///
    /// Afterwards the guard is empty, every non-moderator is idle and the
    /// session is completed.
    pub async fn stop(&self, id: &SessionId) -> Result<(), ConversationError> {
        let Some(runtime) = self.runtime(id) else {
            debug!("Stop ignored for session {}: not registered", id);
            return Ok(());
        };
        let mut control = runtime.control.lock().await;

        {
            let mut inner = runtime.lock();
            let RuntimeInner {
                state,
                interruption,
            } = &mut *inner;
            interruption.stop(state);
        }

        if let Some(handle) = control.take()
            && let Some(handle) = self.await_exit(id, handle).await
        {
            warn!("Loop for session {} did not stop in time, aborting", id);
            handle.abort();
        }

        let result = self.finalize_session(id).await;
        runtime.guard().force_release();

        {
            let mut sessions = self.sessions();
            if sessions
                .get(id)
                .is_some_and(|current| Arc::ptr_eq(current, &runtime))
            {
                sessions.remove(id);
            }
        }

        info!("Conversation stopped for session {}", id);
        result
    }

    async fn finalize_session(&self, id: &SessionId) -> Result<(), ConversationError> {
        let snapshot = match self.deps.store.get_session(id).await {
            Ok(snapshot) => snapshot,
            Err(StoreError::SessionNotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for participant in snapshot.participants.iter().filter(|p| !p.is_moderator()) {
            self.deps
                .store
                .set_participant_status(id, &participant.id, ParticipantStatus::Idle)
                .await?;
        }
        self.deps
            .store
            .set_session_status(id, SessionStatus::Completed)
            .await?;
        Ok(())
    }

    /// True while a loop is registered and running
    pub fn is_active(&self, id: &SessionId) -> bool {
        self.runtime(id).is_some_and(|runtime| runtime.is_running())
    }

    pub fn stats(&self, id: &SessionId) -> Option<ConversationStats> {
        self.runtime(id).map(|runtime| runtime.stats())
    }

    /// Ids of every registered session whose loop is running
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .sessions()
            .values()
            .filter(|runtime| runtime.is_running())
            .map(|runtime| runtime.id().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Stop every registered session
    pub async fn shutdown(&self) {
        let ids: Vec<SessionId> = self.sessions().keys().cloned().collect();
        for id in ids {
            if let Err(e) = self.stop(&id).await {
                warn!("Failed to stop session {} during shutdown: {}", id, e);
            }
        }
    }

    fn spawn_loop(&self, runtime: &Arc<SessionRuntime>) -> JoinHandle<LoopExit> {
        let conversation = ConversationLoop::new(Arc::clone(runtime), self.deps.clone());
        tokio::spawn(conversation.run())
    }

    /// Wait up to the stop grace period for a loop to exit.
    ///
    /// Returns the handle back if the loop is still running.
    async fn await_exit(
        &self,
        id: &SessionId,
        mut handle: JoinHandle<LoopExit>,
    ) -> Option<JoinHandle<LoopExit>> {
        let grace = self.deps.config.timings.stop_grace();
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(exit)) => {
                debug!("Loop for session {} exited: {}", id, exit);
                None
            }
            Ok(Err(e)) => {
                warn!("Loop task for session {} failed: {}", id, e);
                None
            }
            Err(_) => Some(handle),
        }
    }
}
