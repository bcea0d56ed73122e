//! Provider gateway port
//!
//! Defines the interface for asking a model backend for the next utterance.

use async_trait::async_trait;
use colloquy_domain::retry::classify::is_server_status;
use colloquy_domain::{ConversationWindow, ErrorClass, Participant, classify_message};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during provider calls
///
/// Variants carry enough information for the retry executor to classify
/// them without inspecting adapter internals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Timeout, reset, refused, DNS or similar transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 5xx from the backend
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// HTTP 4xx from the backend (auth, quota, bad request)
    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// The call observed the cancellation token
    #[error("Request aborted")]
    Aborted,

    /// Untagged failure; classified from its message
    #[error("Provider error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Build a tagged error from an HTTP-style status code
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if is_server_status(status) {
            GatewayError::Server { status, message }
        } else {
            GatewayError::Client { status, message }
        }
    }

    /// Retry classification for this error
    pub fn classify(&self) -> ErrorClass {
        match self {
            GatewayError::Aborted => ErrorClass::Aborted,
            GatewayError::Network(_) | GatewayError::Server { .. } => ErrorClass::Retryable,
            GatewayError::Client { .. } => ErrorClass::Fatal,
            GatewayError::Other(message) => classify_message(message),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.classify() == ErrorClass::Aborted
    }
}

/// Gateway to model backends
///
/// Implementations (adapters) live in the infrastructure layer. They should
/// return [`GatewayError::Aborted`] promptly once `cancel` fires.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Produce `participant`'s next message
    async fn generate(
        &self,
        participant: &Participant,
        window: &ConversationWindow,
        system_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError>;
}
