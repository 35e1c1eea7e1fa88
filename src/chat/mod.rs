//! Chat core: history log, sessions, broadcast fan-out and command dispatch.

mod command;
mod history;
pub mod hub;
mod session;
mod state;

pub use command::{parse_line, Command, Line};
pub use history::HistoryLog;
pub use session::{ClientSession, SessionRegistry, SessionWriter};
pub use state::{ChatState, LineOutcome};
