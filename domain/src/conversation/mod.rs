//! Conversation orchestration domain.
//!
//! Pure state and policy for one session's turn-taking loop:
//!
//! - [`scheduler::TurnScheduler`]: ordered rotation, resync and skip rules
//! - [`state::ConversationState`]: per-session loop state and its stats view
//! - [`window::ConversationWindow`]: transcript slice handed to a provider
//! - [`pacing::PacingPolicy`]: inter-turn delay per backend

pub mod pacing;
pub mod scheduler;
pub mod state;
pub mod window;

pub use pacing::PacingPolicy;
pub use scheduler::{SchedulerPolicy, SkipReason, TurnDecision, TurnScheduler};
pub use state::{ConversationState, ConversationStats, Interruption, LoopExit, LoopPhase};
pub use window::{ConversationWindow, WindowEntry, WindowRole};
