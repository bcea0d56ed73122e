//! Session store adapters.
//!
//! Provides [`InMemorySessionStore`], a process-local implementation of the
//! [`SessionStore`](colloquy_application::SessionStore) port used by the CLI
//! and by tests.

mod in_memory;

pub use in_memory::InMemorySessionStore;
