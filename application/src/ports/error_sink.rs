//! Port for recording terminal provider failures.
//!
//! Only the final outcome of a retried operation reaches the sink;
//! intermediate retryable failures are not recorded.

use chrono::{DateTime, Utc};
use colloquy_domain::{ParticipantId, SessionId};
use serde::{Deserialize, Serialize};

/// One terminal failure of a retried operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub operation: String,
    /// Attempt on which the operation gave up (1-based)
    pub attempt: u32,
    pub max_attempts: u32,
    pub provider: String,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Write-only sink for failure records.
///
/// Intentionally synchronous and non-fallible so that recording a failure
/// never disrupts the conversation loop.
pub trait ErrorSink: Send + Sync {
    fn record(&self, record: FailureRecord);
}

/// No-op implementation for tests and when failure logging is disabled.
pub struct NoErrorSink;

impl ErrorSink for NoErrorSink {
    fn record(&self, _record: FailureRecord) {}
}
