//! The chat WebSocket endpoint: one socket per connection, bridged to the
//! dispatcher.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, warn};

use roomcast_relay::{ConnectionId, InboundEnvelope, RelayError};

use crate::state::GatewayState;

/// Chat WebSocket connection handler
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state))
}

async fn handle_chat_socket(socket: WebSocket, state: Arc<GatewayState>) {
    let connection = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();

    let mut outbound_rx = state.connections.register(connection);
    state.dispatcher.on_connect(connection).await;
    debug!(%connection, "websocket connected");

    // Write pump: drain the per-connection channel into the socket. A failed
    // send means the peer is gone; the read side notices and cleans up.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => dispatch_frame(&state, connection, &text).await,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Disconnect path: tear down the channel first so the implicit-leave
    // fan-out never targets this connection.
    state.connections.unregister(connection);
    if let Err(err) = state.dispatcher.on_disconnect(connection).await {
        error!(%connection, error = %err, "disconnect cleanup failed");
    }
    send_task.abort();
    debug!(%connection, "websocket disconnected");
}

/// Decode one text frame and hand it to the dispatcher. Rejected envelopes
/// are dropped; there is no error channel back to the sender.
async fn dispatch_frame(state: &GatewayState, connection: ConnectionId, text: &str) {
    debug!(%connection, payload = %text, "inbound frame");

    let envelope = match InboundEnvelope::decode(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%connection, error = %err, "dropping malformed frame");
            return;
        }
    };

    match state.dispatcher.handle(connection, envelope).await {
        Ok(()) => {}
        Err(err @ RelayError::UnknownSession { .. }) => {
            // Integration bug between gateway and dispatcher, not client
            // input; surface it loudly.
            error!(%connection, error = %err, "dispatch failed");
        }
        Err(err) => warn!(%connection, error = %err, "dropping rejected envelope"),
    }
}
