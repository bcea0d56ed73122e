//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod error_sink;
pub mod progress;
pub mod provider_gateway;
pub mod session_store;
