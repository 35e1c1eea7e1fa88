//! Client sessions and the live session registry.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

/// Write half of a session's transport.
///
/// Boxed so the registry can hold TCP write halves in production and
/// in-memory pipes in tests.
pub type SessionWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A connected client.
///
/// The registry owns the canonical instance; the per-connection task refers
/// to it only by id, through the shared state lock.
pub struct ClientSession {
    /// Unique session identifier, assigned at accept time.
    id: Uuid,
    /// Display name; empty until `/register`.
    name: String,
    /// Remote peer address.
    peer_addr: SocketAddr,
    /// While set, the session is paging through history and is skipped
    /// by live broadcasts.
    scrolled_up: bool,
    /// Write half of the transport.
    writer: SessionWriter,
}

impl ClientSession {
    /// Create a new session for an accepted connection.
    pub fn new(writer: SessionWriter, peer_addr: SocketAddr) -> Self {
        let id = Uuid::new_v4();
        debug!("Created session {} for {}", id, peer_addr);

        Self {
            id,
            name: String::new(),
            peer_addr,
            scrolled_up: false,
            writer,
        }
    }

    /// Get the session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the display name (empty until registered).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `/register` has been processed for this session.
    pub fn is_registered(&self) -> bool {
        !self.name.is_empty()
    }

    /// Set the display name.
    ///
    /// Returns false (and leaves the name unchanged) if the session is
    /// already registered; the name is set exactly once.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if self.is_registered() {
            return false;
        }
        self.name = name.into();
        true
    }

    /// Get the peer address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Whether the session is currently in scroll mode.
    pub fn is_scrolled_up(&self) -> bool {
        self.scrolled_up
    }

    /// Set or clear scroll mode.
    pub fn set_scrolled_up(&mut self, scrolled_up: bool) {
        self.scrolled_up = scrolled_up;
    }

    /// Write a line to this session's transport.
    pub async fn send(&mut self, line: &str) -> std::io::Result<()> {
        // One write per line so the terminator never lands in a separate
        // transport chunk; the protocol frames messages by chunk boundaries.
        self.writer.write_all(format!("{line}\r\n").as_bytes()).await?;
        self.writer.flush().await
    }

    /// Shut down the write half of the transport (best effort).
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }
}

/// The live set of connected sessions, keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, ClientSession>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, returning its id.
    pub fn insert(&mut self, session: ClientSession) -> Uuid {
        let id = session.id();
        self.sessions.insert(id, session);
        debug!("Registered session {} (total: {})", id, self.sessions.len());
        id
    }

    /// Remove a session. Safe to call for an id that is already gone.
    pub fn remove(&mut self, id: Uuid) -> Option<ClientSession> {
        let session = self.sessions.remove(&id);
        if session.is_some() {
            debug!(
                "Unregistered session {} (total: {})",
                id,
                self.sessions.len()
            );
        }
        session
    }

    /// Get a mutable reference to a session.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ClientSession> {
        self.sessions.get_mut(&id)
    }

    /// Whether a session is present.
    pub fn contains(&self, id: Uuid) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate mutably over all sessions.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientSession> {
        self.sessions.values_mut()
    }
}
