//! Application layer for colloquy
//!
//! This crate contains the conversation engine, port definitions, and
//! engine configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, LoopTimings};
pub use ports::{
    error_sink::{ErrorSink, FailureRecord, NoErrorSink},
    progress::{ConversationProgress, NoProgress},
    provider_gateway::{GatewayError, ProviderGateway},
    session_store::{SessionStore, StoreError},
};
pub use use_cases::concurrency_guard::{ConcurrencyGuard, GenerationPermit};
pub use use_cases::conversation_manager::{ConversationError, ConversationManager};
pub use use_cases::interruption::InterruptionManager;
pub use use_cases::retry_executor::{OperationContext, RetryError, RetryExecutor};
pub use use_cases::run_conversation::{ConversationLoop, LoopDeps};
pub use use_cases::session_runtime::SessionRuntime;
