//! Failure log settings from TOML (`[error_log]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[error_log]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileErrorLogConfig {
    pub enabled: bool,
    /// JSONL file for terminal provider failures
    /// (default: `<data dir>/colloquy/errors.jsonl`)
    pub path: Option<PathBuf>,
}

impl Default for FileErrorLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl FileErrorLogConfig {
    /// Where records go, or `None` when disabled or no location is known
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("colloquy").join("errors.jsonl")))
    }
}
