//! TCP accept loop feeding the chat core.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::chat::ChatState;
use crate::config::ServerConfig;
use super::handler::run_session;
use crate::{ChatError, Result};

/// Accept errors that reflect a dying peer rather than a broken listener.
///
/// A peer can reset its connection between the TCP handshake and our
/// `accept`; that costs us nothing. Anything else (out of file
/// descriptors, listener torn down) will fail every subsequent accept, so
/// the serve loop treats it as fatal instead of spinning on it.
fn is_transient(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::Interrupted
    )
}

/// The chat server: a TCP listener plus the shared chat state every
/// session task mutates under the command lock.
pub struct ChatServer {
    listener: TcpListener,
    state: Arc<Mutex<ChatState>>,
    slots: Arc<Semaphore>,
    max_sessions: usize,
}

impl ChatServer {
    /// Bind the configured address.
    ///
    /// A bind failure is fatal to startup; the error propagates to the
    /// caller.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        info!("Chat server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            state: Arc::new(Mutex::new(ChatState::new())),
            slots: Arc::new(Semaphore::new(config.max_connections)),
            max_sessions: config.max_connections,
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle to the shared chat state.
    pub fn state(&self) -> Arc<Mutex<ChatState>> {
        self.state.clone()
    }

    /// Maximum number of concurrently served sessions.
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Number of sessions currently being served.
    pub fn active_sessions(&self) -> usize {
        self.max_sessions - self.slots.available_permits()
    }

    /// Accept connections until the listener breaks, one session task per
    /// client.
    ///
    /// Each accepted connection goes straight into [`run_session`] with the
    /// shared state; its slot frees when that task finishes, on any exit
    /// path. When every slot is taken, further connections wait in the OS
    /// backlog until a session ends.
    pub async fn serve(&self) -> Result<()> {
        loop {
            let slot = self
                .slots
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ChatError::Io(std::io::Error::other("session slots closed")))?;

            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) if is_transient(&e) => {
                    warn!("Connection attempt failed: {}", e);
                    continue;
                }
                Err(e) => {
                    error!("Listener broken: {}", e);
                    return Err(e.into());
                }
            };

            let state = self.state.clone();
            tokio::spawn(async move {
                run_session(state, stream, peer_addr).await;
                drop(slot);
            });
        }
    }
}
