//! Room registry: the mapping from room id to connected member set.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::entities::ConnectionId;

/// Snapshot of one room at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: String,
    pub members: HashSet<ConnectionId>,
}

/// Owns every room's member set behind a single registry-wide lock.
///
/// All operations are O(1) or O(members) and hold the lock only for the
/// mutation or snapshot itself; fan-out happens outside the lock. A room
/// whose member set becomes empty is evicted immediately, which is
/// unobservable to callers because `members_of` treats unknown and empty
/// rooms identically.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, HashSet<ConnectionId>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing room or create and return a new empty one.
    pub async fn ensure_room(&self, room_id: &str) -> Room {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(room_id.to_string()).or_default();
        Room {
            room_id: room_id.to_string(),
            members: members.clone(),
        }
    }

    /// Add a member to a room, creating the room on first join. Idempotent:
    /// adding an already-present member is a no-op.
    pub async fn add_member(&self, room_id: &str, connection: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection);
    }

    /// Remove a member from a room. Idempotent: removing an absent member or
    /// referencing an unknown room is a no-op.
    pub async fn remove_member(&self, room_id: &str, connection: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(&connection);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    /// Snapshot of the current member set. Empty for unknown rooms.
    pub async fn members_of(&self, room_id: &str) -> HashSet<ConnectionId> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_room_creates_an_empty_room() {
        let registry = RoomRegistry::new();

        let room = registry.ensure_room("42").await;
        assert_eq!(room.room_id, "42");
        assert!(room.members.is_empty());
    }

    #[tokio::test]
    async fn add_member_is_idempotent() {
        let registry = RoomRegistry::new();
        let connection = ConnectionId::new();

        registry.add_member("42", connection).await;
        registry.add_member("42", connection).await;

        let members = registry.members_of("42").await;
        assert_eq!(members.len(), 1);
        assert!(members.contains(&connection));
    }

    #[tokio::test]
    async fn remove_member_is_idempotent() {
        let registry = RoomRegistry::new();
        let kept = ConnectionId::new();
        let removed = ConnectionId::new();

        registry.add_member("42", kept).await;
        registry.add_member("42", removed).await;

        registry.remove_member("42", removed).await;
        registry.remove_member("42", removed).await;
        // Unknown room: also a no-op.
        registry.remove_member("nowhere", removed).await;

        let members = registry.members_of("42").await;
        assert_eq!(members.len(), 1);
        assert!(members.contains(&kept));
    }

    #[tokio::test]
    async fn members_of_unknown_room_is_empty() {
        let registry = RoomRegistry::new();
        assert!(registry.members_of("nowhere").await.is_empty());
    }

    #[tokio::test]
    async fn empty_room_is_evicted_after_last_member_leaves() {
        let registry = RoomRegistry::new();
        let connection = ConnectionId::new();

        registry.add_member("42", connection).await;
        registry.remove_member("42", connection).await;

        assert!(registry.members_of("42").await.is_empty());
        assert!(registry.rooms.read().await.is_empty());
    }
}
