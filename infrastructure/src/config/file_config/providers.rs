//! Provider configuration from TOML (`[providers.<name>]` sections)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which adapter backs a provider name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileProviderKind {
    /// Run `command` once per turn
    #[default]
    Command,
    /// Offline echo backend
    Echo,
}

/// One `[providers.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub kind: FileProviderKind,
    /// Program to run (command providers)
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Per-call timeout in seconds (default: 120)
    pub timeout_secs: Option<u64>,
    /// Simulated generation time in milliseconds (echo providers)
    pub latency_ms: u64,
}

/// All provider tables keyed by name
pub type FileProvidersConfig = HashMap<String, FileProviderConfig>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_providers() {
        let toml_str = r#"
[local]
command = "ollama-turn"
args = ["--model", "llama3"]
timeout_secs = 30

[offline]
kind = "echo"
latency_ms = 250
"#;
        let providers: FileProvidersConfig = toml::from_str(toml_str).unwrap();
        let local = &providers["local"];
        assert_eq!(local.kind, FileProviderKind::Command);
        assert_eq!(local.command.as_deref(), Some("ollama-turn"));
        assert_eq!(local.args, vec!["--model", "llama3"]);
        assert_eq!(local.timeout_secs, Some(30));
        assert_eq!(providers["offline"].kind, FileProviderKind::Echo);
        assert_eq!(providers["offline"].latency_ms, 250);
    }
}
