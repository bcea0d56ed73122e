//! Retry policy and failure classification.
//!
//! - [`policy::RetryPolicy`]: attempt budget and exponential backoff math
//! - [`classify::ErrorClass`]: retryable / fatal / aborted verdicts

pub mod classify;
pub mod policy;

pub use classify::{ErrorClass, classify_message};
pub use policy::RetryPolicy;
