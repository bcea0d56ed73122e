//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Format of the final session stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON object
    Json,
}

/// CLI arguments for colloquy
#[derive(Parser, Debug)]
#[command(name = "colloquy")]
#[command(author, version, about = "Multi-agent conversation runner - agents take turns talking")]
#[command(long_about = r#"
Colloquy runs a conversation between several AI agents. Each agent takes a
turn in join order, sees the recent transcript and adds one message.
Failed provider calls are retried with exponential backoff; an agent whose
provider keeps failing is marked as errored and skipped.

Press Ctrl-C to stop the conversation.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./colloquy.toml     Project-level config
3. ~/.config/colloquy/config.toml   Global config

Environment variables prefixed with COLLOQUY_ override file values
(use `__` for nesting, e.g. COLLOQUY_RETRY__MAX_RETRIES=5).

Example:
  colloquy "Is Rust's borrow checker worth the learning curve?"
  colloquy --max-turns 12 --config debate.toml
  colloquy --dry-run "Plan a road trip"
"#)]
pub struct Cli {
    /// Opening prompt (overrides session.prompt from the config)
    pub prompt: Option<String>,

    /// Stop after this many messages (overrides session.max_turns)
    #[arg(short = 'n', long, value_name = "N")]
    pub max_turns: Option<u64>,

    /// Session id to run under
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    /// Route every participant to the offline echo provider
    #[arg(long)]
    pub dry_run: bool,

    /// Format of the stats printed at the end
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print the final stats
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
