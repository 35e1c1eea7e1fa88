//! Shared chat state and command dispatch.
//!
//! `ChatState` bundles the history log and the session registry. The whole
//! struct lives behind one `tokio::sync::Mutex` taken by the session loop
//! after every transport read and held for the full parse, mutate and
//! fan-out pass. That serializes command processing across all sessions:
//! history index assignment, registry mutation and the resulting broadcast
//! happen as one atomic step, so every recipient observes broadcasts in
//! history append order.

use std::net::SocketAddr;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::command::{parse_line, Command, Line};
use super::history::HistoryLog;
use super::hub;
use super::session::{ClientSession, SessionRegistry, SessionWriter};

/// Reply sent for unrecognized or malformed input.
const UNKNOWN_COMMAND: &str = "Unknown command";

/// What the session loop should do after a line has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Keep reading from this session.
    Continue,
    /// The session has left; stop the loop.
    Disconnect,
}

/// The shared mutable domain: history plus live sessions.
#[derive(Default)]
pub struct ChatState {
    history: HistoryLog,
    registry: SessionRegistry,
}

impl ChatState {
    /// Create empty chat state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted connection, returning its session id.
    pub fn connect(&mut self, writer: SessionWriter, peer_addr: SocketAddr) -> Uuid {
        let id = self.registry.insert(ClientSession::new(writer, peer_addr));
        info!("Session {} connected from {}", id, peer_addr);
        id
    }

    /// The chat history.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The live session registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Process one input line from a session.
    pub async fn handle_line(&mut self, id: Uuid, line: &str) -> LineOutcome {
        debug!("Session {}: {:?}", id, line);

        match parse_line(line) {
            Line::Message(text) => {
                self.post_chat(id, &text).await;
                LineOutcome::Continue
            }
            Line::Command(Command::Register(name)) => {
                self.register(id, &name).await;
                LineOutcome::Continue
            }
            Line::Command(Command::ScrollUp(idx)) => {
                self.scroll_up(id, idx).await;
                LineOutcome::Continue
            }
            Line::Command(Command::ScrollDown(idx)) => {
                self.scroll_down(id, idx).await;
                LineOutcome::Continue
            }
            Line::Command(Command::Exit) => {
                self.disconnect(id).await;
                LineOutcome::Disconnect
            }
            Line::Command(Command::Unknown(_)) => {
                hub::unicast(&mut self.registry, id, UNKNOWN_COMMAND).await;
                LineOutcome::Continue
            }
        }
    }

    /// `/register <name>`: set the name once, announce the join to everyone.
    async fn register(&mut self, id: Uuid, name: &str) {
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };

        if !session.set_name(name) {
            warn!("Session {} attempted re-registration as {}", id, name);
            hub::unicast(&mut self.registry, id, UNKNOWN_COMMAND).await;
            return;
        }

        let line = format!("{} {} has joined the chat", self.history.len(), name);
        self.history.append(line.clone());
        info!("Session {} registered as {}", id, name);

        // The sender is not excluded; the appended line is the only reply.
        hub::broadcast(&mut self.registry, &line, None).await;
    }

    /// A chat message: append and fan out to everyone, sender included.
    ///
    /// An unregistered sender posts with an empty name label; the protocol
    /// never verified registration before chatting.
    async fn post_chat(&mut self, id: Uuid, text: &str) {
        let Some(session) = self.registry.get_mut(id) else {
            return;
        };
        let name = session.name().to_string();

        let line = format!("{} {}: {}", self.history.len(), name, text);
        self.history.append(line.clone());

        hub::broadcast(&mut self.registry, &line, None).await;
    }

    /// `/scroll_up <idx>`: unicast the line above `idx` and enter scroll mode.
    async fn scroll_up(&mut self, id: Uuid, idx: usize) {
        if idx != 0 {
            match self.history.get(idx - 1) {
                Ok(line) => {
                    let reply = format!("/scroll_up {line}");
                    hub::unicast(&mut self.registry, id, &reply).await;
                }
                Err(e) => warn!("Session {} scroll_up {}: {}", id, idx, e),
            }
        }

        // Entering scroll mode is idempotent and happens even at the oldest
        // line, so a paging client stops receiving live traffic.
        if let Some(session) = self.registry.get_mut(id) {
            session.set_scrolled_up(true);
        }
    }

    /// `/scroll_down <idx>`: unicast the line below `idx`; leaving scroll
    /// mode once the newest line has been handed out.
    async fn scroll_down(&mut self, id: Uuid, idx: usize) {
        let newest = self.history.newest_index();
        let next = idx.checked_add(1);

        if Some(idx) != newest {
            match next.map(|n| self.history.get(n)) {
                Some(Ok(line)) => {
                    let reply = format!("/scroll_down {line}");
                    hub::unicast(&mut self.registry, id, &reply).await;
                }
                Some(Err(e)) => warn!("Session {} scroll_down {}: {}", id, idx, e),
                None => warn!("Session {} scroll_down {}: index overflow", id, idx),
            }
        }

        // Scroll mode ends once the newest line is being handed out, or the
        // requester is already sitting on it.
        let at_newest = Some(idx) == newest || (next.is_some() && next == newest);
        if at_newest {
            if let Some(session) = self.registry.get_mut(id) {
                session.set_scrolled_up(false);
            }
        }
    }

    /// `/exit` (or a synthesized one on EOF/read error): announce the leave
    /// to everyone else, then tear the session down.
    async fn disconnect(&mut self, id: Uuid) {
        let Some(session) = self.registry.get_mut(id) else {
            // Already torn down, e.g. by a failed delivery.
            return;
        };
        let name = session.name().to_string();
        let peer_addr = session.peer_addr();

        let line = format!("{} {} has left the chat", self.history.len(), name);
        self.history.append(line.clone());

        hub::broadcast(&mut self.registry, &line, Some(id)).await;

        if let Some(session) = self.registry.remove(id) {
            session.close().await;
        }
        info!("Session {} ({}) disconnected", id, peer_addr);
    }
}
