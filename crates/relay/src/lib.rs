//! # Roomcast Relay Crate
//!
//! This crate provides the core of the Roomcast chat relay: the normalized
//! message envelope, the room and session registries, and the dispatcher that
//! turns inbound envelopes into registry mutation plus room-wide fan-out.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (envelope, connection id, room, session)
//! - **Registries**: Shared-state ownership of rooms and sessions
//! - **Dispatcher**: The single place inbound envelopes are interpreted
//! - **Sink**: Persistence seam for dispatched envelopes
//! - **Types**: Error taxonomy and shared result alias
//!
//! The crate is transport-agnostic: the gateway supplies raw frames and a
//! per-connection send primitive through the [`Transport`] trait.

pub mod dispatcher;
pub mod entities;
pub mod registries;
pub mod sink;
pub mod types;

// Re-export main types for convenience
pub use dispatcher::{Dispatcher, Transport};
pub use entities::{
    join_notice, leave_notice, ConnectionId, EnvelopeKind, InboundEnvelope, OutboundEnvelope,
};
pub use registries::{Membership, Room, RoomRegistry, SessionRegistry};
pub use sink::{FileHistorySink, NoopSink, PersistenceSink};
pub use types::{RelayError, RelayResult};
