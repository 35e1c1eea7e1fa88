//! scrollchat - a multi-client TCP chat server with scrollback.
//!
//! Clients connect over plain TCP, register a display name, exchange
//! broadcast messages and page backward/forward through the shared chat
//! history one line at a time.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use chat::{ChatState, HistoryLog, LineOutcome, SessionRegistry};
pub use config::Config;
pub use error::{ChatError, Result};
pub use server::{run_session, ChatServer};
