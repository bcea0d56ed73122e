//! Command provider: one child process per turn.
//!
//! The request is written to the child's stdin as a single JSON object:
//!
//! ```json
//! {
//!   "participant": {"id": "alice", "name": "Alice", "model": "llama3", "provider": "local"},
//!   "system_prompt": "...",
//!   "messages": [{"role": "other", "speaker": "Bob", "content": "..."}]
//! }
//! ```
//!
//! Trimmed stdout is the reply. A non-zero exit turns stderr into a
//! [`GatewayError::Other`], so the usual message classification decides
//! whether the turn is retried. The child is killed when the turn is
//! cancelled.

use async_trait::async_trait;
use colloquy_application::ports::provider_gateway::{GatewayError, ProviderGateway};
use colloquy_domain::{ConversationWindow, Participant};
use serde::Serialize;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default per-call timeout (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct RequestParticipant<'a> {
    id: &'a str,
    name: &'a str,
    model: &'a str,
    provider: &'a str,
}

#[derive(Serialize)]
struct Request<'a> {
    participant: RequestParticipant<'a>,
    system_prompt: &'a str,
    messages: &'a [colloquy_domain::WindowEntry],
}

#[derive(Debug, Clone)]
pub struct CommandProviderGateway {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProviderGateway {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn request_body(
        participant: &Participant,
        window: &ConversationWindow,
        system_prompt: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        let request = Request {
            participant: RequestParticipant {
                id: participant.id.as_str(),
                name: &participant.name,
                model: &participant.model,
                provider: &participant.provider,
            },
            system_prompt,
            messages: window.entries(),
        };
        serde_json::to_vec(&request)
            .map_err(|e| GatewayError::Other(format!("Failed to encode request: {}", e)))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }

    async fn run(&self, body: Vec<u8>) -> std::io::Result<Output> {
        let mut child = self.command().spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&body).await?;
            // dropping stdin closes the pipe
        }
        child.wait_with_output().await
    }

    fn interpret(&self, output: Output) -> Result<String, GatewayError> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::Other(format!(
                "{} exited with {}: {}",
                self.name,
                output.status,
                stderr.trim()
            )));
        }
        let reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if reply.is_empty() {
            return Err(GatewayError::Other(format!(
                "{} returned an empty reply",
                self.name
            )));
        }
        Ok(reply)
    }
}

#[async_trait]
impl ProviderGateway for CommandProviderGateway {
    async fn generate(
        &self,
        participant: &Participant,
        window: &ConversationWindow,
        system_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Aborted);
        }
        let body = Self::request_body(participant, window, system_prompt)?;
        debug!(
            "Running {} for {} ({} request bytes)",
            self.program,
            participant.id,
            body.len()
        );

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GatewayError::Aborted),
            result = tokio::time::timeout(self.timeout, self.run(body)) => result,
        };

        match output {
            Ok(Ok(output)) => self.interpret(output),
            Ok(Err(e)) => Err(GatewayError::Other(format!(
                "Failed to run {}: {}",
                self.program, e
            ))),
            Err(_) => Err(GatewayError::Network(format!(
                "{} timed out after {:?}",
                self.name, self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_domain::{ErrorClass, SessionSnapshot, TranscriptMessage};

    fn sh(name: &str, script: &str) -> CommandProviderGateway {
        CommandProviderGateway::new(name, "sh").with_args(["-c", script])
    }

    fn participant() -> Participant {
        Participant::agent("alice", "local", "llama3").with_name("Alice")
    }

    async fn call(gateway: &CommandProviderGateway) -> Result<String, GatewayError> {
        let mut snapshot = SessionSnapshot::new("s");
        snapshot.participants = vec![participant()];
        snapshot.messages = vec![TranscriptMessage::from_user("Opening question")];
        let window = ConversationWindow::build(&snapshot, &"alice".into(), 20);
        gateway
            .generate(&participant(), &window, "Be brief.", &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_stdout_is_the_reply() {
        let gateway = sh("local", "cat > /dev/null; echo '  hello there  '");
        assert_eq!(call(&gateway).await.unwrap(), "hello there");
    }

    #[tokio::test]
    async fn test_request_is_written_to_stdin() {
        let gateway = sh("local", "cat");
        let echoed = call(&gateway).await.unwrap();
        let request: serde_json::Value = serde_json::from_str(&echoed).unwrap();
        assert_eq!(request["participant"]["id"], "alice");
        assert_eq!(request["participant"]["model"], "llama3");
        assert_eq!(request["system_prompt"], "Be brief.");
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"], "Opening question");
    }

    #[tokio::test]
    async fn test_stderr_drives_classification() {
        let retryable = sh("local", "cat > /dev/null; echo 'read ECONNRESET' >&2; exit 1");
        let error = call(&retryable).await.unwrap_err();
        assert_eq!(error.classify(), ErrorClass::Retryable);

        let fatal = sh("local", "cat > /dev/null; echo '401 Unauthorized' >&2; exit 2");
        let error = call(&fatal).await.unwrap_err();
        assert_eq!(error.classify(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let gateway = sh("local", "cat > /dev/null");
        assert!(call(&gateway).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_program_is_fatal() {
        let gateway = CommandProviderGateway::new("ghost", "/nonexistent/colloquy-provider");
        let error = call(&gateway).await.unwrap_err();
        assert_eq!(error.classify(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn test_timeout_is_retryable() {
        let gateway = sh("slow", "sleep 5").with_timeout(Duration::from_millis(100));
        let error = call(&gateway).await.unwrap_err();
        assert!(matches!(error, GatewayError::Network(_)));
        assert_eq!(error.classify(), ErrorClass::Retryable);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_the_child() {
        let gateway = sh("slow", "sleep 30");
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = gateway
            .generate(&participant(), &ConversationWindow::default(), "", &token)
            .await;
        assert_eq!(result, Err(GatewayError::Aborted));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
