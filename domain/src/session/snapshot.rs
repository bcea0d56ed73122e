//! Point-in-time view of a session read from the store.

use crate::core::ids::{ParticipantId, SessionId};
use crate::participant::Participant;
use crate::session::entities::{SessionStatus, TranscriptMessage};
use serde::{Deserialize, Serialize};

/// Snapshot of one session: roster, status and transcript.
///
/// The loop re-reads this every iteration because external actors may
/// add or remove participants between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub status: SessionStatus,
    pub participants: Vec<Participant>,
    pub messages: Vec<TranscriptMessage>,
}

impl SessionSnapshot {
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            status: SessionStatus::Active,
            participants: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Eligible participants in join order (stable for equal timestamps).
    pub fn eligible_participants(&self) -> Vec<&Participant> {
        let mut eligible: Vec<&Participant> =
            self.participants.iter().filter(|p| p.is_eligible()).collect();
        eligible.sort_by_key(|p| p.joined_at);
        eligible
    }

    pub fn eligible_ids(&self) -> Vec<ParticipantId> {
        self.eligible_participants()
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn transcript_len(&self) -> usize {
        self.messages.len()
    }

    pub fn last_message(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }
}
