//! Failure classification for provider calls.
//!
//! Patterns are checked in order: cancellation first, then network-class
//! symptoms and 5xx, and everything else is fatal.

use serde::{Deserialize, Serialize};

/// Verdict for a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Transient; try again after backoff
    Retryable,
    /// Permanent; surface immediately
    Fatal,
    /// User cancellation; never retried, never logged as a failure
    Aborted,
}

impl ErrorClass {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorClass::Retryable)
    }
}

const ABORT_PATTERNS: &[&str] = &["aborterror", "aborted", "cancelled", "canceled"];

const NETWORK_PATTERNS: &[&str] = &[
    "econnreset",
    "econnrefused",
    "etimedout",
    "enotfound",
    "eai_again",
    "epipe",
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "connection closed",
    "socket hang up",
    "dns",
    "fetch failed",
    "network",
];

/// True when `status` is an HTTP 5xx code.
pub fn is_server_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// Look for a standalone 5xx status code in free text ("HTTP 503", "status: 502").
fn mentions_server_status(text: &str) -> bool {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 3)
        .filter_map(|token| token.parse::<u16>().ok())
        .any(is_server_status)
}

/// Classify an error from its message text alone.
pub fn classify_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();

    if ABORT_PATTERNS.iter().any(|p| lower.contains(p)) {
        return ErrorClass::Aborted;
    }

    if NETWORK_PATTERNS.iter().any(|p| lower.contains(p)) || mentions_server_status(&lower) {
        return ErrorClass::Retryable;
    }

    ErrorClass::Fatal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_retryable() {
        for msg in [
            "read ECONNRESET",
            "connect ECONNREFUSED 127.0.0.1:443",
            "Request timeout after 30s",
            "getaddrinfo ENOTFOUND api.example.com",
            "TypeError: fetch failed",
            "socket hang up",
        ] {
            assert_eq!(classify_message(msg), ErrorClass::Retryable, "{msg}");
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert_eq!(
            classify_message("HTTP 503 Service Unavailable"),
            ErrorClass::Retryable
        );
        assert_eq!(classify_message("status=502"), ErrorClass::Retryable);
    }

    #[test]
    fn test_client_errors_are_fatal() {
        assert_eq!(classify_message("401 Unauthorized"), ErrorClass::Fatal);
        assert_eq!(classify_message("HTTP 429 quota"), ErrorClass::Fatal);
        assert_eq!(classify_message("invalid request body"), ErrorClass::Fatal);
    }

    #[test]
    fn test_abort_wins_over_network() {
        assert_eq!(
            classify_message("AbortError: request aborted during timeout"),
            ErrorClass::Aborted
        );
    }

    #[test]
    fn test_longer_numbers_are_not_status_codes() {
        assert_eq!(classify_message("token 50312 rejected"), ErrorClass::Fatal);
    }
}
