//! Session registry: per-connection state for every live connection.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::entities::ConnectionId;
use crate::types::{RelayError, RelayResult};

/// The room a session is currently joined to, together with the sender
/// identity it joined as. The sender is kept so a disconnect can synthesize a
/// leave notice naming the right user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: String,
    pub sender: String,
}

/// Owns the state of every live connection.
///
/// A session is in at most one room at a time. Operations on a connection
/// that was never opened (or was already closed) fail with
/// [`RelayError::UnknownSession`]: that is a transport-adapter integration
/// bug, not an expected runtime condition.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, Option<Membership>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session with no room.
    pub async fn open(&self, connection: ConnectionId) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(connection, None);
    }

    /// Remove the session, returning the membership it held, if any, so the
    /// caller can perform cleanup fan-out.
    pub async fn close(&self, connection: ConnectionId) -> RelayResult<Option<Membership>> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&connection)
            .ok_or(RelayError::unknown_session(connection))
    }

    /// Record the session's current room, overwriting any prior membership.
    /// The caller is responsible for leaving the prior room first.
    pub async fn set_room(
        &self,
        connection: ConnectionId,
        room_id: &str,
        sender: &str,
    ) -> RelayResult<()> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(&connection)
            .ok_or(RelayError::unknown_session(connection))?;
        *slot = Some(Membership {
            room_id: room_id.to_string(),
            sender: sender.to_string(),
        });
        Ok(())
    }

    /// Reset the session to the unjoined state after an explicit leave.
    pub async fn clear_room(&self, connection: ConnectionId) -> RelayResult<()> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(&connection)
            .ok_or(RelayError::unknown_session(connection))?;
        *slot = None;
        Ok(())
    }

    /// Current room of a session, if it has joined one.
    pub async fn room_of(&self, connection: ConnectionId) -> RelayResult<Option<String>> {
        let sessions = self.sessions.read().await;
        let membership = sessions
            .get(&connection)
            .ok_or(RelayError::unknown_session(connection))?;
        Ok(membership.as_ref().map(|m| m.room_id.clone()))
    }
}
