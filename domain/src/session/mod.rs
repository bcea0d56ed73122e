//! Conversation session domain.
//!
//! - [`entities::SessionStatus`]: externally visible session lifecycle
//! - [`entities::TranscriptMessage`]: one entry of the append-only transcript
//! - [`snapshot::SessionSnapshot`]: what the engine reads from the store each iteration

pub mod entities;
pub mod snapshot;

pub use entities::{MessageAuthor, SessionStatus, TranscriptMessage};
pub use snapshot::SessionSnapshot;
