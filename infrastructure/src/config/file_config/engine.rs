//! Engine tuning from TOML (`[retry]`, `[scheduler]`, `[pacing]`, `[timings]`, `[context]`)

use colloquy_domain::conversation::window::DEFAULT_CONTEXT_MESSAGES;
use serde::{Deserialize, Serialize};

/// `[context]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContextConfig {
    /// Recent transcript messages handed to a provider per turn
    pub messages: usize,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            messages: DEFAULT_CONTEXT_MESSAGES,
        }
    }
}
