//! Participant entity and its role/status value objects

use crate::core::error::DomainError;
use crate::core::ids::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a participant in a session.
///
/// Moderators steer the session but never take rotation turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Moderator,
    #[default]
    Agent,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Moderator => "moderator",
            ParticipantRole::Agent => "agent",
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParticipantRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "moderator" => Ok(ParticipantRole::Moderator),
            "agent" | "participant" => Ok(ParticipantRole::Agent),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// Lifecycle status of a participant as seen by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    #[default]
    Idle,
    Active,
    Thinking,
    Error,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Idle => "idle",
            ParticipantStatus::Active => "active",
            ParticipantStatus::Thinking => "thinking",
            ParticipantStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(ParticipantStatus::Idle),
            "active" => Ok(ParticipantStatus::Active),
            "thinking" => Ok(ParticipantStatus::Thinking),
            "error" => Ok(ParticipantStatus::Error),
            other => Err(DomainError::InvalidParticipantStatus(other.to_string())),
        }
    }
}

/// A model agent (or moderator) attached to a session (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name used in prompts and transcripts
    pub name: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    /// Backend name used for routing and pacing (e.g. "openai", "local")
    pub provider: String,
    /// Model identifier passed through to the backend
    pub model: String,
    /// Overrides the default system prompt when set
    pub system_prompt: Option<String>,
    /// Rotation order is join order
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn agent(
        id: impl Into<ParticipantId>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            role: ParticipantRole::Agent,
            status: ParticipantStatus::Idle,
            provider: provider.into(),
            model: model.into(),
            system_prompt: None,
            joined_at: Utc::now(),
        }
    }

    pub fn moderator(id: impl Into<ParticipantId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            role: ParticipantRole::Moderator,
            status: ParticipantStatus::Idle,
            provider: String::new(),
            model: String::new(),
            system_prompt: None,
            joined_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_status(mut self, status: ParticipantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn joined_at(mut self, at: DateTime<Utc>) -> Self {
        self.joined_at = at;
        self
    }

    pub fn is_moderator(&self) -> bool {
        self.role == ParticipantRole::Moderator
    }

    /// Rotation eligibility: not a moderator and not in `error`.
    pub fn is_eligible(&self) -> bool {
        !self.is_moderator() && self.status != ParticipantStatus::Error
    }
}
