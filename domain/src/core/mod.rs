//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: session and participant identifiers
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: small text helpers

pub mod error;
pub mod ids;
pub mod string;
