//! Logging infrastructure: terminal failure records.
//!
//! Provides [`JsonlErrorSink`], a JSONL file writer that implements the
//! [`ErrorSink`](colloquy_application::ErrorSink) port.

mod jsonl_error_sink;

pub use jsonl_error_sink::JsonlErrorSink;
