//! Per-connection send channels backing the relay's transport seam.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::debug;

use roomcast_relay::{ConnectionId, Transport};

/// Registry of live connections and their outbound frame channels.
///
/// `send` is non-blocking: frames go into an unbounded channel drained by the
/// connection's write pump. A frame sent to an unknown or just-closed
/// connection is dropped, which is the at-most-once delivery the relay
/// promises for broken connections.
#[derive(Debug, Default)]
pub struct ConnectionMap {
    senders: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, returning the receiving half for its write
    /// pump.
    pub fn register(&self, connection: ConnectionId) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection, tx);
        rx
    }

    /// Drop a connection's channel. Idempotent.
    pub fn unregister(&self, connection: ConnectionId) {
        self.senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection);
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.senders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for ConnectionMap {
    fn send(&self, connection: &ConnectionId, frame: String) {
        let sender = self
            .senders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(connection)
            .cloned();

        match sender {
            Some(sender) => {
                if sender.send(frame).is_err() {
                    // Write pump already gone; the read side will unregister.
                    debug!(%connection, "dropping frame for closing connection");
                }
            }
            None => debug!(%connection, "dropping frame for unknown connection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_frames_to_registered_connections() {
        let map = ConnectionMap::new();
        let connection = ConnectionId::new();
        let mut rx = map.register(connection);

        map.send(&connection, "hello".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn send_to_unknown_connection_is_a_no_op() {
        let map = ConnectionMap::new();
        map.send(&ConnectionId::new(), "hello".to_string());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let map = ConnectionMap::new();
        let connection = ConnectionId::new();
        let _rx = map.register(connection);

        map.unregister(connection);
        map.unregister(connection);

        assert!(map.is_empty());
    }
}
