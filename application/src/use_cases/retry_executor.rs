//! Retry executor
//!
//! Runs a fallible async operation under a [`RetryPolicy`], observing the
//! session's cancellation token between and during attempts. Only the
//! terminal outcome of an operation is reported to the [`ErrorSink`].

use crate::ports::error_sink::{ErrorSink, FailureRecord};
use crate::use_cases::shared::sleep_or_cancel;
use chrono::Utc;
use colloquy_domain::{ErrorClass, ParticipantId, RetryPolicy, SessionId};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identifies the operation for logs and failure records
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub operation: &'static str,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub provider: String,
}

/// Terminal outcome of a retried operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The token fired; nothing is recorded
    #[error("Operation aborted")]
    Aborted,

    #[error("Fatal error after {attempts} attempt(s): {error}")]
    Fatal { attempts: u32, error: E },

    #[error("Retries exhausted after {attempts} attempt(s): {error}")]
    Exhausted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted)
    }

    /// Number of attempts made; 0 for aborts
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Aborted => 0,
            RetryError::Fatal { attempts, .. } | RetryError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            RetryError::Aborted => None,
            RetryError::Fatal { error, .. } | RetryError::Exhausted { error, .. } => Some(error),
        }
    }
}

/// Executes operations with exponential backoff
pub struct RetryExecutor {
    policy: RetryPolicy,
    sink: Arc<dyn ErrorSink>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, sink: Arc<dyn ErrorSink>) -> Self {
        Self { policy, sink }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails fatally, is aborted, or the
    /// attempt budget runs out.
    ///
    /// Attempt 1 runs immediately; attempt `k` waits
    /// [`RetryPolicy::delay_for_attempt`]. The token is checked before each
    /// attempt, raced against the attempt itself, and raced against the
    /// backoff sleep.
    pub async fn execute<T, E, F, Fut, C>(
        &self,
        context: &OperationContext,
        token: &CancellationToken,
        mut operation: F,
        classify: C,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> ErrorClass,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            if token.is_cancelled() {
                return Err(RetryError::Aborted);
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(RetryError::Aborted),
                result = operation() => result,
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            // an error returned after the token fired is an abort, whatever its text
            if token.is_cancelled() {
                return Err(RetryError::Aborted);
            }

            match classify(&error) {
                ErrorClass::Aborted => return Err(RetryError::Aborted),
                ErrorClass::Fatal => {
                    self.report(context, attempt, &error, "fatal");
                    return Err(RetryError::Fatal {
                        attempts: attempt,
                        error,
                    });
                }
                ErrorClass::Retryable if attempt >= max_attempts => {
                    self.report(context, attempt, &error, "exhausted");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        error,
                    });
                }
                ErrorClass::Retryable => {
                    attempt += 1;
                    let delay = self.policy.delay_for_attempt(attempt);
                    debug!(
                        "{} for {} failed ({}), retrying in {:?} (attempt {}/{})",
                        context.operation,
                        context.participant_id,
                        error,
                        delay,
                        attempt,
                        max_attempts
                    );
                    if !sleep_or_cancel(delay, token).await {
                        return Err(RetryError::Aborted);
                    }
                }
            }
        }
    }

    fn report(&self, context: &OperationContext, attempt: u32, error: &dyn Display, kind: &str) {
        let max_attempts = self.policy.max_attempts();
        warn!(
            "{} for {} in session {} failed ({}) on attempt {}/{}: {}",
            context.operation,
            context.participant_id,
            context.session_id,
            kind,
            attempt,
            max_attempts,
            error
        );
        self.sink.record(FailureRecord {
            operation: context.operation.to_string(),
            attempt,
            max_attempts,
            provider: context.provider.clone(),
            session_id: context.session_id.clone(),
            participant_id: context.participant_id.clone(),
            message: error.to_string(),
            timestamp: Utc::now(),
        });
    }
}
