//! Presentation-level configuration
//!
//! Controls what the turn-by-turn reporter prints.

use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Print a line for every skipped turn
    pub show_skips: bool,
    /// Print session stats when the run ends
    pub show_stats: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_skips: false,
            show_stats: true,
        }
    }
}
