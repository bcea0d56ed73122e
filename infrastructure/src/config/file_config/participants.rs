//! Session roster from TOML (`[[participants]]` and `[session]`)

use colloquy_domain::{DomainError, Participant, ParticipantRole};
use serde::{Deserialize, Serialize};

/// One `[[participants]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileParticipantConfig {
    pub id: String,
    /// Display name (default: the id)
    #[serde(default)]
    pub name: Option<String>,
    /// "agent" (default) or "moderator"
    #[serde(default = "default_role")]
    pub role: String,
    /// Name of a `[providers.<name>]` table
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_role() -> String {
    ParticipantRole::Agent.as_str().to_string()
}

impl FileParticipantConfig {
    pub fn parse_role(&self) -> Result<ParticipantRole, DomainError> {
        self.role.parse()
    }

    pub fn is_agent(&self) -> bool {
        self.parse_role().is_ok_and(|r| r == ParticipantRole::Agent)
    }

    /// Build the domain participant. Join order is the caller's concern.
    pub fn to_participant(&self) -> Result<Participant, DomainError> {
        let mut participant = match self.parse_role()? {
            ParticipantRole::Moderator => Participant::moderator(self.id.as_str()),
            ParticipantRole::Agent => {
                Participant::agent(self.id.as_str(), self.provider.as_str(), self.model.as_str())
            }
        };
        if let Some(name) = &self.name {
            participant = participant.with_name(name);
        }
        if let Some(prompt) = &self.system_prompt {
            participant = participant.with_system_prompt(prompt);
        }
        Ok(participant)
    }
}

/// `[session]` section: what the CLI runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub id: String,
    /// Opening prompt appended as a user message
    pub prompt: Option<String>,
    /// Stop after this many turns (unbounded when unset)
    pub max_turns: Option<u64>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            prompt: None,
            max_turns: None,
        }
    }
}
