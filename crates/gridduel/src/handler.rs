//! Per-connection handler: register with the hub, pump frames both ways.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the hub
//!   2. Spawn a writer task that drains that channel into the socket
//!   3. Loop: receive text frames → forward to the hub
//!   4. On close, tell the hub the connection is gone

use std::sync::Arc;

use gridduel_protocol::ConnectionId;
use gridduel_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::hub::HubHandle;
use crate::GridDuelError;

/// Drop guard that reports the disconnect even if the handler unwinds.
///
/// `Drop` is synchronous, so the notification goes out from a
/// fire-and-forget task.
struct DisconnectGuard {
    id: ConnectionId,
    hub: HubHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let id = self.id;
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let _ = hub.disconnected(id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    hub: HubHandle,
) -> Result<(), GridDuelError> {
    let conn = Arc::new(conn);
    let id = conn.id();
    tracing::debug!(%id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    hub.connected(id, tx).await?;
    let _guard = DisconnectGuard {
        id,
        hub: hub.clone(),
    };

    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = conn.send(&frame).await {
                    tracing::debug!(%id, error = %e, "send failed");
                    break;
                }
            }
        })
    };

    let result = loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                if let Err(e) = hub.frame(id, text).await {
                    break Err(e);
                }
            }
            Ok(None) => {
                tracing::info!(%id, "connection closed cleanly");
                break Ok(());
            }
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                break Err(e.into());
            }
        }
    };

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → hub releases the connection.
    result
}
