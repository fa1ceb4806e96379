//! Domain models for the relay.

pub mod connection;
pub mod envelope;

pub use connection::ConnectionId;
pub use envelope::{
    format_sent_at, join_notice, leave_notice, EnvelopeKind, InboundEnvelope, OutboundEnvelope,
    SENT_AT_DISPLAY_FORMAT,
};
