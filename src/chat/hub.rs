//! Broadcast fan-out and unicast delivery.
//!
//! A delivery failure tears down the failing recipient only; the fan-out
//! pass always continues to the remaining recipients. One broken peer must
//! never block or abort a broadcast aimed at everyone else.
//!
//! Callers hold the command lock for the whole pass, so no session can be
//! inserted or removed by another task mid-broadcast.

use tracing::{debug, warn};
use uuid::Uuid;

use super::session::SessionRegistry;

/// Deliver `line` to every registered session except `exclude` and except
/// sessions currently in scroll mode.
///
/// Returns the ids of sessions torn down because delivery to them failed.
pub async fn broadcast(
    registry: &mut SessionRegistry,
    line: &str,
    exclude: Option<Uuid>,
) -> Vec<Uuid> {
    let mut failed = Vec::new();

    for session in registry.iter_mut() {
        if Some(session.id()) == exclude || session.is_scrolled_up() {
            continue;
        }

        if let Err(e) = session.send(line).await {
            warn!(
                "Delivery to session {} ({}) failed: {}",
                session.id(),
                session.peer_addr(),
                e
            );
            failed.push(session.id());
        }
    }

    for id in &failed {
        if let Some(session) = registry.remove(*id) {
            session.close().await;
        }
    }

    if !failed.is_empty() {
        debug!("Broadcast tore down {} session(s)", failed.len());
    }

    failed
}

/// Deliver `line` to a single session, regardless of its scroll mode.
///
/// On delivery failure the recipient is torn down. Returns false if the
/// session was absent or the delivery failed.
pub async fn unicast(registry: &mut SessionRegistry, id: Uuid, line: &str) -> bool {
    let Some(session) = registry.get_mut(id) else {
        return false;
    };

    match session.send(line).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Unicast to session {} failed: {}", id, e);
            if let Some(session) = registry.remove(id) {
                session.close().await;
            }
            false
        }
    }
}
