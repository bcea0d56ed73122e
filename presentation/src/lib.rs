//! Presentation layer for colloquy
//!
//! This crate contains CLI definitions, output formatters
//! and the turn-by-turn progress reporter.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ProgressReporter;
