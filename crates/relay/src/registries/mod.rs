//! Shared-state registries. Each registry is the single source of truth for
//! what it owns: rooms own member sets, sessions own per-connection state.

pub mod rooms;
pub mod sessions;

pub use rooms::{Room, RoomRegistry};
pub use sessions::{Membership, SessionRegistry};
