//! Per-connection handler: greeting, event loop, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a writer task draining the connection's outbound channel
//!   2. Send `connect_response`
//!   3. Loop: receive frames → decode → dispatch
//!   4. On close, remove the player from its room

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use wordlink_protocol::{ClientEvent, Codec, JsonCodec, ServerEvent};
use wordlink_transport::{ConnectionId, WebSocketConnection};

use crate::WordlinkError;
use crate::dispatch::dispatch;
use crate::lifecycle::ConnectionLifecycleManager;
use crate::server::ServerState;

/// Greeting sent as soon as a connection is accepted.
const CONNECT_MESSAGE: &str = "Connected successfully";

/// Sent for frames that do not decode to a known event.
const INVALID_REQUEST_MESSAGE: &str = "Invalid request";

/// Drop guard that removes the connection's player from its room when the
/// handler exits, including by panic.
///
/// Since `Drop` is synchronous, the async cleanup runs on a spawned task.
struct BindingGuard {
    conn_id: ConnectionId,
    lifecycle: Arc<ConnectionLifecycleManager>,
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let lifecycle = Arc::clone(&self.lifecycle);
        tokio::spawn(async move {
            lifecycle.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), WordlinkError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), state.codec, outbound_rx));
    let _guard = BindingGuard {
        conn_id,
        lifecycle: Arc::clone(&state.lifecycle),
    };

    let _ = outbound.send(ServerEvent::ConnectResponse {
        message: CONNECT_MESSAGE.to_string(),
    });

    let result = read_loop(&conn, &state, &outbound).await;

    writer.abort();
    let _ = conn.close().await;
    result
}

async fn read_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    outbound: &wordlink_room::PlayerSender,
) -> Result<(), WordlinkError> {
    let conn_id = conn.id();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode client event");
                let _ = outbound.send(ServerEvent::Error {
                    message: INVALID_REQUEST_MESSAGE.to_string(),
                });
                continue;
            }
        };

        if let Err(e) = dispatch(&state.lifecycle, conn_id, outbound, event).await {
            if e.is_internal() {
                let error_count = state.internal_errors.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(%conn_id, error_count, "internal error count rose");
            }
        }
    }
}

/// Drains the outbound channel onto the wire until the peer goes away.
async fn write_outbound(
    conn: Arc<WebSocketConnection>,
    codec: JsonCodec,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
) {
    let conn_id = conn.id();
    while let Some(event) = outbound.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                let event = event.name();
                tracing::error!(%conn_id, event, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
