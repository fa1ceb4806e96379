//! Shared application state for the gateway.

use std::sync::Arc;

use roomcast_relay::{Dispatcher, PersistenceSink, RoomRegistry, SessionRegistry};

use crate::transport::ConnectionMap;

/// Everything a WebSocket connection needs: the dispatcher and the
/// connection map it fans out through.
pub struct GatewayState {
    pub dispatcher: Dispatcher,
    pub connections: Arc<ConnectionMap>,
}

impl GatewayState {
    /// Build fresh registries and wire the dispatcher to a new connection
    /// map and the given persistence sink.
    pub fn new(sink: Arc<dyn PersistenceSink>) -> Self {
        let connections = Arc::new(ConnectionMap::new());
        let dispatcher = Dispatcher::new(
            Arc::new(RoomRegistry::new()),
            Arc::new(SessionRegistry::new()),
            connections.clone(),
            sink,
        );

        Self {
            dispatcher,
            connections,
        }
    }
}
