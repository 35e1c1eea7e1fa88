//! TCP server module.
//!
//! Provides the accept loop and the per-connection session loop feeding
//! the chat core.

mod handler;
mod listener;

pub use handler::{run_session, READ_BUFFER_SIZE};
pub use listener::ChatServer;
