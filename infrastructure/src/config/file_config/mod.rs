//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod engine;
mod error_log;
mod output;
mod participants;
mod providers;

pub use engine::FileContextConfig;
pub use error_log::FileErrorLogConfig;
pub use output::FileOutputConfig;
pub use participants::{FileParticipantConfig, FileSessionConfig};
pub use providers::{FileProviderConfig, FileProviderKind, FileProvidersConfig};

use super::validation::{ConfigIssue, ConfigIssueCode};
use chrono::{Duration as ChronoDuration, Utc};
use colloquy_application::{EngineConfig, LoopTimings};
use colloquy_domain::conversation::pacing::MIN_TURN_DELAY_MS;
use colloquy_domain::{DomainError, PacingPolicy, Participant, RetryPolicy, SchedulerPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Retry budget and backoff
    pub retry: RetryPolicy,
    /// Self-reply and error cooldowns
    pub scheduler: SchedulerPolicy,
    /// Inter-turn delay and per-provider multipliers
    pub pacing: PacingPolicy,
    /// Loop sleeps and grace periods
    pub timings: LoopTimings,
    /// Provider context window
    pub context: FileContextConfig,
    /// Named backends
    pub providers: FileProvidersConfig,
    /// Terminal failure log
    pub error_log: FileErrorLogConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// What the CLI runs
    pub session: FileSessionConfig,
    /// Session roster, in join order
    pub participants: Vec<FileParticipantConfig>,
}

impl FileConfig {
    /// Engine parameters for [`ConversationManager`](colloquy_application::ConversationManager).
    ///
    /// The pacing floor is raised to the minimum if configured lower.
    pub fn to_engine_config(&self) -> EngineConfig {
        let mut pacing = self.pacing.clone();
        pacing.min_delay_ms = pacing.min_delay_ms.max(MIN_TURN_DELAY_MS);
        EngineConfig::default()
            .with_retry(self.retry.clone())
            .with_scheduler(self.scheduler.clone())
            .with_pacing(pacing)
            .with_timings(self.timings.clone())
            .with_context_messages(self.context.messages.max(1))
    }

    /// Domain participants in configured order.
    ///
    /// Join times are spaced one millisecond apart so rotation follows the
    /// order of `[[participants]]`.
    pub fn roster(&self) -> Result<Vec<Participant>, DomainError> {
        let base = Utc::now();
        self.participants
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry
                    .to_participant()
                    .map(|p| p.joined_at(base + ChronoDuration::milliseconds(i as i64)))
            })
            .collect()
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Roles parse and ids are unique
    /// 2. At least two agents are configured
    /// 3. Every agent's provider has a `[providers.<name>]` table
    /// 4. Command providers name a command
    /// 5. Pacing floor and context window are usable
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1.
        let mut seen = HashSet::new();
        for entry in &self.participants {
            if !seen.insert(entry.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateParticipant {
                        id: entry.id.clone(),
                    },
                    format!("participants: id '{}' appears more than once", entry.id),
                ));
            }
            if let Err(e) = entry.parse_role() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidRole {
                        participant: entry.id.clone(),
                        value: entry.role.clone(),
                    },
                    format!("participants.{}: {}", entry.id, e),
                ));
            }
        }

        // 2.
        let agents: Vec<&FileParticipantConfig> =
            self.participants.iter().filter(|p| p.is_agent()).collect();
        if agents.len() < 2 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::TooFewAgents {
                    found: agents.len(),
                },
                format!(
                    "participants: at least two agents are required, found {}",
                    agents.len()
                ),
            ));
        }

        // 3.
        for agent in &agents {
            if !self.providers.contains_key(&agent.provider) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownProvider {
                        participant: agent.id.clone(),
                        provider: agent.provider.clone(),
                    },
                    format!(
                        "participants.{}: provider '{}' has no [providers.{}] section",
                        agent.id, agent.provider, agent.provider
                    ),
                ));
            }
        }

        // 4.
        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();
        for name in names {
            let provider = &self.providers[name];
            if provider.kind == FileProviderKind::Command
                && provider.command.as_deref().is_none_or(|c| c.trim().is_empty())
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingCommand {
                        provider: name.clone(),
                    },
                    format!("providers.{}: command providers need a `command`", name),
                ));
            }
        }

        // 5.
        if self.pacing.min_delay_ms < MIN_TURN_DELAY_MS {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::PacingFloorTooLow {
                    value: self.pacing.min_delay_ms,
                    floor: MIN_TURN_DELAY_MS,
                },
                format!(
                    "pacing.min_delay_ms: {} is below {}, using {}",
                    self.pacing.min_delay_ms, MIN_TURN_DELAY_MS, MIN_TURN_DELAY_MS
                ),
            ));
        }
        if self.context.messages == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyContextWindow,
                "context.messages: 0 would hide the transcript, using 1",
            ));
        }

        issues
    }
}
