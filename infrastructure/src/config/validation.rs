//! Structured configuration issues.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Fewer than two agents in `[[participants]]`
    TooFewAgents { found: usize },
    /// Two participants share an id
    DuplicateParticipant { id: String },
    /// A participant's role is neither `agent` nor `moderator`
    InvalidRole { participant: String, value: String },
    /// A participant references a provider with no `[providers.<name>]`
    UnknownProvider { participant: String, provider: String },
    /// A command provider has no `command`
    MissingCommand { provider: String },
    /// `[pacing] min_delay_ms` is below the enforced floor
    PacingFloorTooLow { value: u64, floor: u64 },
    /// `[context] messages` is zero
    EmptyContextWindow,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
