//! Application-level configuration.
//!
//! - [`EngineConfig`]: policies and timings for every session loop
//! - [`LoopTimings`]: guard-busy, poll and grace-period sleeps

pub mod engine_config;

pub use engine_config::{EngineConfig, LoopTimings};
