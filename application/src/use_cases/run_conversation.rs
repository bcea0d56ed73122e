//! Loop controller
//!
//! One [`ConversationLoop`] runs per session as a spawned task. It is
//! level-triggered: every iteration re-reads the session from the store,
//! re-derives eligibility, and lets the [`TurnScheduler`] pick the next
//! speaker. The loop owns turn-level bookkeeping; control calls only flip
//! lifecycle flags and swap tokens.
//!
//! [`TurnScheduler`]: colloquy_domain::TurnScheduler

use crate::config::EngineConfig;
use crate::ports::progress::ConversationProgress;
use crate::ports::provider_gateway::{GatewayError, ProviderGateway};
use crate::ports::session_store::{SessionStore, StoreError};
use crate::use_cases::retry_executor::{OperationContext, RetryError, RetryExecutor};
use crate::use_cases::session_runtime::{RuntimeInner, SessionRuntime};
use crate::use_cases::shared::sleep_or_cancel;
use chrono::Utc;
use colloquy_domain::{
    ConversationWindow, LoopExit, MessageAuthor, Participant, ParticipantId, ParticipantStatus,
    PromptTemplate, SessionSnapshot, SessionStatus, SkipReason, TurnDecision,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Operation name used in logs and failure records
const GENERATE_OPERATION: &str = "generate";

/// Collaborators shared by every loop a manager spawns
#[derive(Clone)]
pub struct LoopDeps {
    pub store: Arc<dyn SessionStore>,
    pub gateway: Arc<dyn ProviderGateway>,
    pub executor: Arc<RetryExecutor>,
    pub config: Arc<EngineConfig>,
    pub progress: Arc<dyn ConversationProgress>,
}

/// Control loop for one session.
///
/// The cancellation token is captured at construction; a resumed session
/// gets a new loop with the renewed token.
pub struct ConversationLoop {
    runtime: Arc<SessionRuntime>,
    deps: LoopDeps,
    token: CancellationToken,
}

impl ConversationLoop {
    pub fn new(runtime: Arc<SessionRuntime>, deps: LoopDeps) -> Self {
        let token = runtime.lock().interruption.token();
        Self {
            runtime,
            deps,
            token,
        }
    }

    /// Run until cancelled, interrupted, or the session can no longer continue.
    pub async fn run(self) -> LoopExit {
        let session_id = self.runtime.id().clone();
        info!("Conversation loop started for session {}", session_id);

        let exit = self.run_turns().await;

        if exit.is_terminal() {
            self.runtime.with_state(|state| state.mark_stopped());
            if exit != LoopExit::SessionNotFound
                && let Err(e) = self
                    .deps
                    .store
                    .set_session_status(&session_id, SessionStatus::Completed)
                    .await
            {
                warn!("Failed to mark session {} completed: {}", session_id, e);
            }
        }

        info!(session_id = %session_id, "Conversation loop exited: {}", exit);
        self.deps.progress.on_loop_exit(&session_id, &exit);
        exit
    }

    async fn run_turns(&self) -> LoopExit {
        let session_id = self.runtime.id();
        let timings = &self.deps.config.timings;

        loop {
            if self.token.is_cancelled() {
                return LoopExit::Cancelled;
            }

            // 1. someone is still generating
            if self.runtime.guard().is_generating() {
                if !self.pause_for(timings.guard_busy()).await {
                    return LoopExit::Cancelled;
                }
                continue;
            }

            // 2. fresh snapshot every iteration
            let snapshot = match self.deps.store.get_session(session_id).await {
                Ok(snapshot) => snapshot,
                Err(StoreError::SessionNotFound(_)) => return LoopExit::SessionNotFound,
                Err(e) => {
                    warn!("Failed to read session {}: {}", session_id, e);
                    if !self.pause_for(timings.store_retry()).await {
                        return LoopExit::Cancelled;
                    }
                    continue;
                }
            };

            // 3. paused or completed by someone else; wait for them
            if snapshot.status != SessionStatus::Active {
                debug!(
                    "Session {} is {} externally, waiting",
                    session_id, snapshot.status
                );
                if !self.pause_for(timings.external_pause_poll()).await {
                    return LoopExit::Cancelled;
                }
                continue;
            }

            // 4.
            let eligible = snapshot.eligible_ids();
            if eligible.len() < 2 {
                return LoopExit::InsufficientParticipants {
                    eligible: eligible.len(),
                };
            }

            // 5.
            let decision = self.runtime.with_state(|state| {
                if state.scheduler_mut().resync(&eligible) {
                    debug!("Rotation for session {} rebuilt: {:?}", session_id, eligible);
                }
                state
                    .scheduler()
                    .evaluate(&snapshot, Utc::now(), &self.deps.config.scheduler)
            });

            let participant = match decision {
                Some(TurnDecision::Speak(participant)) => participant,
                Some(TurnDecision::Skip {
                    participant,
                    reason,
                }) => {
                    if !self.skip(&participant, reason).await {
                        return LoopExit::Cancelled;
                    }
                    continue;
                }
                None => {
                    return LoopExit::InsufficientParticipants { eligible: 0 };
                }
            };

            // 6.
            let Some(permit) = self.runtime.guard().try_acquire(&participant.id) else {
                if !self.pause_for(timings.guard_busy()).await {
                    return LoopExit::Cancelled;
                }
                continue;
            };

            // 7-10.
            let outcome = self.take_turn(&participant, &snapshot).await;

            // 11.
            drop(permit);

            if let Some(exit) = outcome {
                return exit;
            }

            // 12.
            let delay = self.deps.config.pacing.delay_for(&participant.provider);
            if !self.pause_for(delay).await {
                return LoopExit::Cancelled;
            }
        }
    }

    /// Run one admitted turn. Returns `Some` when the loop must exit.
    async fn take_turn(
        &self,
        participant: &Participant,
        snapshot: &SessionSnapshot,
    ) -> Option<LoopExit> {
        let session_id = self.runtime.id();
        let id = &participant.id;

        self.set_status(id, ParticipantStatus::Thinking).await;
        self.deps.progress.on_turn_start(session_id, participant);

        let window = ConversationWindow::build(snapshot, id, self.deps.config.context_messages);
        let system_prompt = PromptTemplate::system_prompt_for(participant, snapshot);
        let context = OperationContext {
            operation: GENERATE_OPERATION,
            session_id: session_id.clone(),
            participant_id: id.clone(),
            provider: participant.provider.clone(),
        };

        let gateway = &*self.deps.gateway;
        let window = &window;
        let system_prompt = system_prompt.as_str();
        let token = &self.token;
        let result = self
            .deps
            .executor
            .execute(
                &context,
                token,
                move || gateway.generate(participant, window, system_prompt, token),
                GatewayError::classify,
            )
            .await;

        // a result that lands after the token fired is discarded
        let result = match result {
            Ok(_) if self.token.is_cancelled() => Err(RetryError::Aborted),
            other => other,
        };

        match result {
            Ok(content) => {
                self.complete_turn(participant, &content).await;
                None
            }
            Err(RetryError::Aborted) if !self.token.is_cancelled() => {
                warn!(
                    "{} in session {} reported an abort nobody requested",
                    id, session_id
                );
                self.fail_turn(participant, &RetryError::<GatewayError>::Aborted.to_string()).await;
                None
            }
            Err(RetryError::Aborted) => {
                {
                    let mut inner = self.runtime.lock();
                    let RuntimeInner {
                        state,
                        interruption,
                    } = &mut *inner;
                    interruption.record_abort(state, id.clone(), Utc::now());
                }
                self.set_status(id, ParticipantStatus::Idle).await;
                self.deps.progress.on_interrupted(session_id, id);
                Some(LoopExit::Interrupted {
                    participant: id.clone(),
                })
            }
            Err(error) => {
                self.fail_turn(participant, &error.to_string()).await;
                None
            }
        }
    }

    async fn fail_turn(&self, participant: &Participant, error: &str) {
        self.set_status(&participant.id, ParticipantStatus::Error).await;
        self.runtime.with_state(|state| state.scheduler_mut().advance());
        self.deps
            .progress
            .on_turn_failed(self.runtime.id(), participant, error);
    }

    async fn complete_turn(&self, participant: &Participant, content: &str) {
        let session_id = self.runtime.id();
        let id = &participant.id;
        let author = MessageAuthor::Participant(id.clone());

        match self.deps.store.append_message(session_id, author, content).await {
            Ok(()) => {
                self.runtime.with_state(|state| {
                    state.record_turn(id.clone());
                    state.scheduler_mut().advance();
                });
                self.set_status(id, ParticipantStatus::Active).await;
                info!(
                    "{} spoke in session {} ({} chars)",
                    id,
                    session_id,
                    content.chars().count()
                );
                self.deps
                    .progress
                    .on_turn_complete(session_id, participant, content);
            }
            Err(e) => {
                warn!(
                    "Failed to append message from {} to session {}: {}",
                    id, session_id, e
                );
                self.set_status(id, ParticipantStatus::Idle).await;
                self.runtime.with_state(|state| state.scheduler_mut().advance());
            }
        }
    }

    /// Advance past a skipped participant. Returns false if cancelled.
    async fn skip(&self, participant: &ParticipantId, reason: SkipReason) -> bool {
        let session_id = self.runtime.id();
        if self.token.is_cancelled() {
            return false;
        }
        debug!(
            "Skipping {} in session {}: {}",
            participant,
            session_id,
            reason.as_str()
        );
        self.runtime.with_state(|state| state.scheduler_mut().advance());
        self.deps
            .progress
            .on_turn_skipped(session_id, participant, reason);

        if reason == SkipReason::ErrorStatus {
            return self.pause_for(self.deps.config.scheduler.error_cooldown()).await;
        }
        true
    }

    async fn set_status(&self, participant: &ParticipantId, status: ParticipantStatus) {
        let session_id = self.runtime.id();
        if let Err(e) = self
            .deps
            .store
            .set_participant_status(session_id, participant, status)
            .await
        {
            warn!(
                "Failed to set {} to {} in session {}: {}",
                participant, status, session_id, e
            );
        }
    }

    async fn pause_for(&self, duration: Duration) -> bool {
        sleep_or_cancel(duration, &self.token).await
    }
}
