//! Session store port
//!
//! Defines the interface the engine uses to read and write session data.
//! Persistence technology is an adapter concern.

use async_trait::async_trait;
use colloquy_domain::{
    MessageAuthor, ParticipantId, ParticipantStatus, SessionId, SessionSnapshot, SessionStatus,
};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Store for sessions, participants and transcripts
///
/// Implementations must give read-after-write consistency per session id.
/// Nothing here spans more than one session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the current roster, status and transcript
    async fn get_session(&self, id: &SessionId) -> Result<SessionSnapshot, StoreError>;

    /// Append one message to the transcript
    async fn append_message(
        &self,
        id: &SessionId,
        author: MessageAuthor,
        content: &str,
    ) -> Result<(), StoreError>;

    async fn set_participant_status(
        &self,
        id: &SessionId,
        participant: &ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError>;

    async fn set_session_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError>;
}
