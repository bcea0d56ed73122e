//! Participants taking turns in a conversation.

pub mod entities;

pub use entities::{Participant, ParticipantRole, ParticipantStatus};
