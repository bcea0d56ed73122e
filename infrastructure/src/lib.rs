//! Infrastructure layer for colloquy
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileOutputConfig,
    FileParticipantConfig, FileProviderConfig, FileProviderKind, FileSessionConfig, Severity,
};
pub use logging::JsonlErrorSink;
pub use providers::{CommandProviderGateway, EchoProviderGateway, RoutingProviderGateway};
pub use store::InMemorySessionStore;
