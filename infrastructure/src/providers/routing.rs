//! Routing gateway: one named backend per provider.

use super::{CommandProviderGateway, EchoProviderGateway};
use crate::config::{FileProviderKind, FileProvidersConfig};
use async_trait::async_trait;
use colloquy_application::ports::provider_gateway::{GatewayError, ProviderGateway};
use colloquy_domain::{ConversationWindow, Participant};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Dispatches `generate` to the backend named by `participant.provider`.
///
/// Routing priority:
///  1. a backend registered under the participant's provider name
///  2. the default backend, if one was set
///  3. otherwise a 404-class client error, so the participant goes to `error`
#[derive(Default)]
pub struct RoutingProviderGateway {
    backends: HashMap<String, Arc<dyn ProviderGateway>>,
    default: Option<String>,
}

impl RoutingProviderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// One backend per `[providers.<name>]` table.
    ///
    /// Command providers without a `command` are skipped with a warning;
    /// participants routed to them fail as unknown providers.
    pub fn from_config(providers: &FileProvidersConfig) -> Self {
        let mut gateway = Self::new();
        for (name, config) in providers {
            let backend: Arc<dyn ProviderGateway> = match config.kind {
                FileProviderKind::Echo => Arc::new(
                    EchoProviderGateway::new()
                        .with_latency(Duration::from_millis(config.latency_ms)),
                ),
                FileProviderKind::Command => {
                    let Some(command) = config.command.as_deref().filter(|c| !c.trim().is_empty())
                    else {
                        warn!("Provider '{}' has no command, skipping", name);
                        continue;
                    };
                    let mut backend = CommandProviderGateway::new(name.as_str(), command)
                        .with_args(config.args.iter().map(String::as_str));
                    if let Some(secs) = config.timeout_secs {
                        backend = backend.with_timeout(Duration::from_secs(secs));
                    }
                    Arc::new(backend)
                }
            };
            gateway = gateway.with_backend(name.as_str(), backend);
        }
        gateway
    }

    pub fn with_backend(
        mut self,
        name: impl Into<String>,
        backend: Arc<dyn ProviderGateway>,
    ) -> Self {
        self.backends.insert(name.into(), backend);
        self
    }

    /// Backend used for participants whose provider is not registered
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn backend_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn resolve(&self, provider: &str) -> Result<&dyn ProviderGateway, GatewayError> {
        if let Some(backend) = self.backends.get(provider) {
            return Ok(backend.as_ref());
        }
        if let Some(name) = &self.default
            && let Some(backend) = self.backends.get(name)
        {
            debug!("No backend for provider '{}', using default '{}'", provider, name);
            return Ok(backend.as_ref());
        }
        Err(GatewayError::Client {
            status: 404,
            message: format!("No backend configured for provider '{}'", provider),
        })
    }
}

#[async_trait]
impl ProviderGateway for RoutingProviderGateway {
    async fn generate(
        &self,
        participant: &Participant,
        window: &ConversationWindow,
        system_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        self.resolve(&participant.provider)?
            .generate(participant, window, system_prompt, cancel)
            .await
    }
}
