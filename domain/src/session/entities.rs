//! Session domain entities

use crate::core::error::DomainError;
use crate::core::ids::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session lifecycle as recorded in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "paused" => Ok(SessionStatus::Paused),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(DomainError::InvalidSessionStatus(other.to_string())),
        }
    }
}

/// Who wrote a transcript message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum MessageAuthor {
    /// A rotation turn produced by a participant
    Participant(ParticipantId),
    /// Host-supplied text such as the opening prompt
    User,
}

impl MessageAuthor {
    pub fn participant_id(&self) -> Option<&ParticipantId> {
        match self {
            MessageAuthor::Participant(id) => Some(id),
            MessageAuthor::User => None,
        }
    }
}

/// A single message in the session transcript (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub author: MessageAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TranscriptMessage {
    pub fn from_participant(id: impl Into<ParticipantId>, content: impl Into<String>) -> Self {
        Self {
            author: MessageAuthor::Participant(id.into()),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            author: MessageAuthor::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// True when `id` authored this message
    pub fn is_from(&self, id: &ParticipantId) -> bool {
        self.author.participant_id() == Some(id)
    }
}
