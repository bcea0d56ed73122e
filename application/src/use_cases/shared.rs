//! Shared utilities for use cases.
//!
//! Cancellable sleeps used by the retry executor and the conversation loop.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleep for `duration` unless `token` fires first.
///
/// Returns `true` if the full duration elapsed, `false` if cancelled.
pub(crate) async fn sleep_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
