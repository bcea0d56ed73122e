//! Domain layer for colloquy
//!
//! This crate contains the core entities, value objects and policies of the
//! conversation engine. It has no dependencies on infrastructure or runtime
//! concerns.
//!
//! # Core Concepts
//!
//! ## Rotation
//!
//! Eligible participants (non-moderators not in `error`) take turns in join
//! order. The [`TurnScheduler`] keeps that order in sync with the store and
//! applies the skip rules before a turn is admitted.
//!
//! ## Failure policy
//!
//! Provider failures are classified as retryable, fatal or aborted
//! ([`ErrorClass`]); [`RetryPolicy`] bounds how often a turn is retried.

pub mod conversation;
pub mod core;
pub mod participant;
pub mod prompt;
pub mod retry;
pub mod session;

// Re-export commonly used types
pub use conversation::{
    ConversationState, ConversationStats, ConversationWindow, Interruption, LoopExit, LoopPhase,
    PacingPolicy, SchedulerPolicy, SkipReason, TurnDecision, TurnScheduler, WindowEntry,
    WindowRole,
};
pub use crate::core::{
    error::DomainError,
    ids::{ParticipantId, SessionId},
    string::truncate,
};
pub use participant::{Participant, ParticipantRole, ParticipantStatus};
pub use prompt::PromptTemplate;
pub use retry::{ErrorClass, RetryPolicy, classify_message};
pub use session::{MessageAuthor, SessionSnapshot, SessionStatus, TranscriptMessage};
