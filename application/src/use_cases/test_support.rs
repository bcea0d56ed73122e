//! Hand-written collaborators for engine tests.

use crate::ports::error_sink::{ErrorSink, FailureRecord};
use crate::ports::progress::ConversationProgress;
use crate::ports::provider_gateway::{GatewayError, ProviderGateway};
use crate::ports::session_store::{SessionStore, StoreError};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use colloquy_domain::{
    ConversationWindow, MessageAuthor, Participant, ParticipantId, ParticipantStatus, SessionId,
    SessionSnapshot, SessionStatus, SkipReason, TranscriptMessage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub(crate) struct MemoryStore {
    sessions: Mutex<HashMap<SessionId, SessionSnapshot>>,
}

impl MemoryStore {
    /// A session whose agents joined one second apart, in the given order
    pub(crate) fn with_agents(id: &str, agents: &[&str]) -> Self {
        let store = Self::default();
        let base = Utc::now() - ChronoDuration::minutes(5);
        let mut snapshot = SessionSnapshot::new(id);
        snapshot.participants = agents
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Participant::agent(*name, "mock", "mock-model")
                    .joined_at(base + ChronoDuration::seconds(i as i64))
            })
            .collect();
        store.insert(snapshot);
        store
    }

    pub(crate) fn insert(&self, snapshot: SessionSnapshot) {
        self.sessions
            .lock()
            .unwrap()
            .insert(snapshot.id.clone(), snapshot);
    }

    pub(crate) fn add_participant(&self, id: &str, participant: Participant) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .get_mut(&SessionId::from(id))
            .unwrap()
            .participants
            .push(participant);
    }

    pub(crate) fn snapshot(&self, id: &str) -> SessionSnapshot {
        self.sessions
            .lock()
            .unwrap()
            .get(&SessionId::from(id))
            .cloned()
            .unwrap()
    }

    pub(crate) fn status_of(&self, id: &str, participant: &str) -> ParticipantStatus {
        self.snapshot(id)
            .participant(&ParticipantId::from(participant))
            .unwrap()
            .status
    }

    /// Speakers of the transcript in order, skipping user messages
    pub(crate) fn speakers(&self, id: &str) -> Vec<String> {
        self.snapshot(id)
            .messages
            .iter()
            .filter_map(|m| m.author.participant_id().map(|p| p.to_string()))
            .collect()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session(&self, id: &SessionId) -> Result<SessionSnapshot, StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))
    }

    async fn append_message(
        &self,
        id: &SessionId,
        author: MessageAuthor,
        content: &str,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        session.messages.push(TranscriptMessage {
            author,
            content: content.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn set_participant_status(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        let entry = session
            .participants
            .iter_mut()
            .find(|p| &p.id == participant)
            .ok_or_else(|| StoreError::ParticipantNotFound(participant.clone()))?;
        entry.status = status;
        Ok(())
    }

    async fn set_session_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        session.status = status;
        Ok(())
    }
}

/// What a scripted participant does on its next call
pub(crate) enum Script {
    Reply(String),
    Fail(GatewayError),
    /// Block until the token fires, then report an abort
    Hang,
    /// Run a closure in place of the provider call
    Run(Box<dyn FnOnce() -> Result<String, GatewayError> + Send>),
}

/// Gateway replaying per-participant scripts; unscripted calls succeed
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    scripts: Mutex<HashMap<ParticipantId, VecDeque<Script>>>,
    calls: Mutex<Vec<(ParticipantId, Instant)>>,
}

impl ScriptedGateway {
    pub(crate) fn push(&self, participant: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .entry(ParticipantId::from(participant))
            .or_default()
            .push_back(script);
    }

    /// Every call, one entry per attempt
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }

    /// Every call with the tokio instant it was made at
    pub(crate) fn call_times(&self) -> Vec<(String, Instant)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, at)| (id.to_string(), *at))
            .collect()
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    async fn generate(
        &self,
        participant: &Participant,
        window: &ConversationWindow,
        _system_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((participant.id.clone(), Instant::now()));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&participant.id)
            .and_then(|queue| queue.pop_front());
        match script {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Hang) => {
                cancel.cancelled().await;
                Err(GatewayError::Aborted)
            }
            Some(Script::Run(action)) => action(),
            None => Ok(format!("{} reply after {} messages", participant.id, window.len())),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    records: Mutex<Vec<FailureRecord>>,
}

impl RecordingSink {
    pub(crate) fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn record(&self, record: FailureRecord) {
        self.records.lock().unwrap().push(record);
    }
}

/// Progress listener keeping the skips and failures it saw
#[derive(Default)]
pub(crate) struct RecordingProgress {
    skips: Mutex<Vec<(ParticipantId, SkipReason)>>,
    failures: Mutex<Vec<ParticipantId>>,
}

impl RecordingProgress {
    pub(crate) fn skips(&self) -> Vec<(ParticipantId, SkipReason)> {
        self.skips.lock().unwrap().clone()
    }

    pub(crate) fn failures(&self) -> Vec<ParticipantId> {
        self.failures.lock().unwrap().clone()
    }
}

impl ConversationProgress for RecordingProgress {
    fn on_turn_failed(&self, _session: &SessionId, participant: &Participant, _error: &str) {
        self.failures.lock().unwrap().push(participant.id.clone());
    }

    fn on_turn_skipped(
        &self,
        _session: &SessionId,
        participant: &ParticipantId,
        reason: SkipReason,
    ) {
        self.skips
            .lock()
            .unwrap()
            .push((participant.clone(), reason));
    }
}

/// Poll `condition` on the tokio clock until it holds or `limit` passes
pub(crate) async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}
