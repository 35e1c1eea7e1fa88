//! Per-connection session loop.
//!
//! One task per accepted connection. Each iteration blocks on a single
//! transport read of up to [`READ_BUFFER_SIZE`] bytes, then takes the
//! command lock and processes the bytes as one logical line. There is no
//! message framing beyond the transport's chunk boundaries: one read is one
//! message. A logical message split across reads, or several messages
//! coalesced into one read, is not reassembled. Known protocol limitation,
//! preserved deliberately.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use crate::chat::{ChatState, LineOutcome};

/// Size of the per-session read buffer.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Run one client session to completion.
///
/// Registers the connection, then reads and processes lines until the
/// client exits or the transport closes. On EOF or a read error an `/exit`
/// is synthesized so teardown always goes through the same path.
pub async fn run_session(state: Arc<Mutex<ChatState>>, stream: TcpStream, peer_addr: SocketAddr) {
    let (mut reader, writer) = stream.into_split();

    let id = state
        .lock()
        .await
        .connect(Box::new(writer), peer_addr);

    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                debug!("Session {} read error: {}", id, e);
                0
            }
        };

        // Command lock: held for the full parse/mutate/broadcast pass.
        let mut state = state.lock().await;

        if n == 0 {
            state.handle_line(id, "/exit").await;
            break;
        }

        let text = String::from_utf8_lossy(&buf[..n]);
        let line = text.trim_end_matches(['\r', '\n']);

        if state.handle_line(id, line).await == LineOutcome::Disconnect {
            break;
        }
    }

    debug!("Session {} loop ended", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    async fn accept_one(
        state: Arc<Mutex<ChatState>>,
    ) -> (tokio::net::TcpStream, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();

        let handle = tokio::spawn(run_session(state, stream, peer_addr));
        (client, handle)
    }

    #[tokio::test]
    async fn test_session_registers_on_connect() {
        let state = Arc::new(Mutex::new(ChatState::new()));
        let (_client, handle) = accept_one(state.clone()).await;

        let mut registered = false;
        for _ in 0..100 {
            if state.lock().await.registry().len() == 1 {
                registered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(registered);

        handle.abort();
    }

    #[tokio::test]
    async fn test_peer_close_synthesizes_exit() {
        let state = Arc::new(Mutex::new(ChatState::new()));
        let (mut client, handle) = accept_one(state.clone()).await;

        client.write_all(b"/register Alice").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Closing the client socket ends the loop through the /exit path.
        drop(client);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let state = state.lock().await;
        assert!(state.registry().is_empty());
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().get(1).unwrap(), "1 Alice has left the chat");
    }

    #[tokio::test]
    async fn test_explicit_exit_ends_loop() {
        let state = Arc::new(Mutex::new(ChatState::new()));
        let (mut client, handle) = accept_one(state.clone()).await;

        client.write_all(b"/exit").await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let state = state.lock().await;
        assert!(state.registry().is_empty());
    }

    #[tokio::test]
    async fn test_trailing_newline_is_stripped() {
        let state = Arc::new(Mutex::new(ChatState::new()));
        let (mut client, handle) = accept_one(state.clone()).await;

        client.write_all(b"/register Alice\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.write_all(b"hello\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let state = state.lock().await;
            assert_eq!(state.history().get(0).unwrap(), "0 Alice has joined the chat");
            assert_eq!(state.history().get(1).unwrap(), "1 Alice: hello");
        }

        handle.abort();
    }
}
