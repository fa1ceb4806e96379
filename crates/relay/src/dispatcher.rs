//! The dispatcher: the single place where an inbound envelope is interpreted
//! and turned into registry mutation plus outbound fan-out.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::entities::{
    format_sent_at, join_notice, leave_notice, ConnectionId, EnvelopeKind, InboundEnvelope,
    OutboundEnvelope,
};
use crate::registries::{RoomRegistry, SessionRegistry};
use crate::sink::PersistenceSink;
use crate::types::{RelayError, RelayResult};

/// Per-connection send primitive supplied by the transport adapter.
///
/// Sends are best-effort and must not block the dispatcher: a slow or broken
/// connection is the implementation's problem and never aborts delivery to
/// other recipients.
pub trait Transport: Send + Sync {
    fn send(&self, connection: &ConnectionId, frame: String);
}

/// Resolves inbound envelopes into registry mutation and room-wide fan-out.
///
/// Owns neither registry's data: both are injected at construction and remain
/// the single source of truth for membership. Membership snapshots are read
/// under the registry lock; sending happens outside it.
pub struct Dispatcher {
    rooms: Arc<RoomRegistry>,
    sessions: Arc<SessionRegistry>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn PersistenceSink>,
}

impl Dispatcher {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        sessions: Arc<SessionRegistry>,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            rooms,
            sessions,
            transport,
            sink,
        }
    }

    /// Register a freshly accepted connection.
    pub async fn on_connect(&self, connection: ConnectionId) {
        self.sessions.open(connection).await;
        debug!(%connection, "session opened");
    }

    /// Interpret one inbound envelope: mutate the registries per its kind and
    /// broadcast the display-ready outbound envelope to the room.
    ///
    /// A rejected envelope (malformed shape, invalid timestamp) is dropped
    /// entirely: no broadcast, no persistence.
    pub async fn handle(
        &self,
        connection: ConnectionId,
        envelope: InboundEnvelope,
    ) -> RelayResult<()> {
        if envelope.room_id.is_empty() {
            return Err(RelayError::malformed("empty room_id"));
        }

        let sent_at = format_sent_at(envelope.parse_sent_at()?);

        let (body, recipients) = match envelope.kind {
            EnvelopeKind::Join => {
                // A session is in at most one room: leave the old room before
                // entering the new one.
                if let Some(previous) = self.sessions.room_of(connection).await? {
                    if previous != envelope.room_id {
                        self.rooms.remove_member(&previous, connection).await;
                    }
                }
                self.rooms.add_member(&envelope.room_id, connection).await;
                self.sessions
                    .set_room(connection, &envelope.room_id, &envelope.sender)
                    .await?;

                let recipients = self.rooms.members_of(&envelope.room_id).await;
                (join_notice(&envelope.sender), recipients)
            }
            EnvelopeKind::Leave => {
                // The session's own membership is authoritative for which
                // room is being left. A LEAVE naming any other room (or sent
                // while unjoined) must not clear the session, or the two
                // registries desynchronize and the connection stays in its
                // real room's member set forever.
                let current = self.sessions.room_of(connection).await?;
                if current.as_deref() != Some(envelope.room_id.as_str()) {
                    return Err(RelayError::malformed(format!(
                        "leave names room {:?} but session is in {:?}",
                        envelope.room_id, current
                    )));
                }

                // Snapshot before removal: the leaving member still receives
                // its own leave notice (self-echo), matching the behavior of
                // a broker the leaver is subscribed to until the notice is
                // out.
                let recipients = self.rooms.members_of(&envelope.room_id).await;
                self.rooms.remove_member(&envelope.room_id, connection).await;
                self.sessions.clear_room(connection).await?;

                (leave_notice(&envelope.sender), recipients)
            }
            EnvelopeKind::Talk => {
                let recipients = self.rooms.members_of(&envelope.room_id).await;
                (envelope.body.clone(), recipients)
            }
        };

        let outbound = OutboundEnvelope {
            kind: envelope.kind,
            room_id: envelope.room_id,
            sender: envelope.sender,
            body,
            sent_at,
        };

        self.broadcast(&outbound, &recipients);
        Ok(())
    }

    /// Connection-lifecycle cleanup: close the session and, if it was in a
    /// room, dispatch a synthesized leave to the remaining members. The
    /// disconnecting connection is excluded since it can no longer receive.
    pub async fn on_disconnect(&self, connection: ConnectionId) -> RelayResult<()> {
        let Some(membership) = self.sessions.close(connection).await? else {
            debug!(%connection, "session closed without a room");
            return Ok(());
        };

        self.rooms
            .remove_member(&membership.room_id, connection)
            .await;
        let recipients = self.rooms.members_of(&membership.room_id).await;

        let outbound = OutboundEnvelope {
            kind: EnvelopeKind::Leave,
            room_id: membership.room_id,
            sender: membership.sender.clone(),
            body: leave_notice(&membership.sender),
            sent_at: format_sent_at(Utc::now()),
        };

        self.broadcast(&outbound, &recipients);
        Ok(())
    }

    /// Deliver one envelope to every recipient and record it with the sink
    /// exactly once (not once per recipient).
    fn broadcast(&self, envelope: &OutboundEnvelope, recipients: &HashSet<ConnectionId>) {
        match serde_json::to_string(envelope) {
            Ok(frame) => {
                for connection in recipients {
                    self.transport.send(connection, frame.clone());
                }
            }
            Err(error) => warn!(%error, "failed to encode outbound envelope"),
        }

        self.sink.record(envelope);
    }
}
