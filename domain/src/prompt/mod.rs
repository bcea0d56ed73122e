//! Prompt domain
//!
//! System prompt used when a participant has none of its own.

mod template;

pub use template::PromptTemplate;
