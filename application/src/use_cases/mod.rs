//! Use cases
//!
//! The conversation engine: retry executor, concurrency guard, interruption
//! manager, the per-session loop and the manager that owns them.

pub mod concurrency_guard;
pub mod conversation_manager;
pub mod interruption;
pub mod retry_executor;
pub mod run_conversation;
pub mod session_runtime;
pub(crate) mod shared;

#[cfg(test)]
pub(crate) mod test_support;
