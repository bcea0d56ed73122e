//! In-memory session store.
//!
//! Sessions live in a `RwLock<HashMap<..>>`. Every operation touches exactly
//! one session, so read-after-write holds per session id.

use async_trait::async_trait;
use chrono::Utc;
use colloquy_application::ports::session_store::{SessionStore, StoreError};
use colloquy_domain::{
    MessageAuthor, Participant, ParticipantId, ParticipantStatus, SessionId, SessionSnapshot,
    SessionStatus, TranscriptMessage,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionSnapshot>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, SessionSnapshot>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, SessionSnapshot>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut SessionSnapshot) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut sessions = self.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.clone()))?;
        f(session)
    }

    /// Register an empty session. Replaces any session with the same id.
    pub fn create_session(&self, id: impl Into<SessionId>) -> SessionId {
        let id = id.into();
        debug!("Creating session {}", id);
        self.write()
            .insert(id.clone(), SessionSnapshot::new(id.clone()));
        id
    }

    pub fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            session.participants.retain(|p| p.id != participant.id);
            session.participants.push(participant);
            Ok(())
        })
    }

    pub fn remove_participant(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
    ) -> Result<Participant, StoreError> {
        self.with_session(id, |session| {
            let index = session
                .participants
                .iter()
                .position(|p| &p.id == participant)
                .ok_or_else(|| StoreError::ParticipantNotFound(participant.clone()))?;
            Ok(session.participants.remove(index))
        })
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, id: &SessionId) -> Result<SessionSnapshot, StoreError> {
        self.read()
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
        self.with_session(id, |session| {
            session.messages.push(TranscriptMessage {
                author,
                content: content.to_string(),
                created_at: Utc::now(),
            });
            Ok(())
        })
    }

    async fn set_participant_status(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            let entry = session
                .participants
                .iter_mut()
                .find(|p| &p.id == participant)
                .ok_or_else(|| StoreError::ParticipantNotFound(participant.clone()))?;
            entry.status = status;
            Ok(())
        })
    }

    async fn set_session_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        self.with_session(id, |session| {
            session.status = status;
            Ok(())
        })
    }
}
