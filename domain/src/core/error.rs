//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid participant role: {0}")]
    InvalidRole(String),

    #[error("Invalid participant status: {0}")]
    InvalidParticipantStatus(String),

    #[error("Invalid session status: {0}")]
    InvalidSessionStatus(String),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),
}
