//! Echo provider: answers from the window without any backend.
//!
//! Used for `--dry-run` and for exercising the engine offline.

use async_trait::async_trait;
use colloquy_application::ports::provider_gateway::{GatewayError, ProviderGateway};
use colloquy_domain::{ConversationWindow, Participant, truncate};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Longest quoted excerpt in a reply
const QUOTE_CHARS: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct EchoProviderGateway {
    latency: Duration,
}

impl EchoProviderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate generation time; the wait observes cancellation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn reply(participant: &Participant, window: &ConversationWindow) -> String {
        match window.last() {
            Some(last) => format!(
                "{} ({}) replying to {}: \"{}\"",
                participant.name,
                participant.model,
                last.speaker,
                truncate(last.content.trim(), QUOTE_CHARS)
            ),
            None => format!("{} opens the conversation.", participant.name),
        }
    }
}

#[async_trait]
impl ProviderGateway for EchoProviderGateway {
    async fn generate(
        &self,
        participant: &Participant,
        window: &ConversationWindow,
        _system_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        if !self.latency.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GatewayError::Aborted),
                _ = tokio::time::sleep(self.latency) => {}
            }
        }
        Ok(Self::reply(participant, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_domain::{SessionSnapshot, TranscriptMessage};

    fn alice() -> Participant {
        Participant::agent("alice", "echo", "echo-1").with_name("Alice")
    }

    #[tokio::test]
    async fn test_opening_line() {
        let gateway = EchoProviderGateway::new();
        let reply = gateway
            .generate(
                &alice(),
                &ConversationWindow::default(),
                "",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(reply, "Alice opens the conversation.");
    }

    #[tokio::test]
    async fn test_replies_to_last_speaker() {
        let mut snapshot = SessionSnapshot::new("s");
        snapshot.participants = vec![alice()];
        snapshot.messages = vec![TranscriptMessage::from_user("What about lifetimes?")];
        let window = ConversationWindow::build(&snapshot, &"alice".into(), 20);

        let reply = EchoProviderGateway::new()
            .generate(&alice(), &window, "", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            reply,
            "Alice (echo-1) replying to user: \"What about lifetimes?\""
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_cancellable() {
        let gateway = EchoProviderGateway::new().with_latency(Duration::from_secs(60));
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = gateway
            .generate(&alice(), &ConversationWindow::default(), "", &token)
            .await;
        assert_eq!(result, Err(GatewayError::Aborted));
    }
}
