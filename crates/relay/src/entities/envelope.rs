//! The normalized chat event exchanged between client and server.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{RelayError, RelayResult};

/// Display format applied to `sent_at` before broadcast and persistence.
///
/// Date and time to one-second precision, local to the server process.
pub const SENT_AT_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Message kind. Closed set: anything else on the wire is rejected during
/// decoding, so every downstream match is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeKind {
    Join,
    Leave,
    Talk,
}

impl EnvelopeKind {
    /// Wire/display name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::Join => "JOIN",
            EnvelopeKind::Leave => "LEAVE",
            EnvelopeKind::Talk => "TALK",
        }
    }
}

/// Envelope as received from a client, before the dispatcher has interpreted
/// it. `sent_at` is an ISO-8601 absolute timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEnvelope {
    pub kind: EnvelopeKind,
    pub room_id: String,
    pub sender: String,
    #[serde(default)]
    pub body: String,
    pub sent_at: String,
}

impl InboundEnvelope {
    /// Decode a raw text frame. An unknown `kind` or any shape mismatch is a
    /// [`RelayError::MalformedEnvelope`].
    pub fn decode(frame: &str) -> RelayResult<Self> {
        serde_json::from_str(frame).map_err(|error| RelayError::malformed(error.to_string()))
    }

    /// Parse `sent_at` into the instant it denotes.
    pub fn parse_sent_at(&self) -> RelayResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.sent_at)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|_| RelayError::invalid_timestamp(self.sent_at.clone()))
    }
}

/// Envelope in its final, display-ready form. `body` is either synthesized
/// (JOIN/LEAVE) or the client text verbatim (TALK), and `sent_at` is already
/// formatted for display. No downstream component re-transforms these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub kind: EnvelopeKind,
    pub room_id: String,
    pub sender: String,
    pub body: String,
    pub sent_at: String,
}

/// Reformat an instant into the fixed display form, in the server's local
/// timezone. Lossless with respect to the instant it denotes.
pub fn format_sent_at(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(SENT_AT_DISPLAY_FORMAT)
        .to_string()
}

/// System-generated join announcement. User-visible contract; the leading
/// space and quoting are part of the exact text.
pub fn join_notice(sender: &str) -> String {
    format!(" ' {sender} '님이 입장하셨습니다.")
}

/// System-generated leave announcement.
pub fn leave_notice(sender: &str) -> String {
    format!(" ' {sender} '님이 퇴장하셨습니다.")
}
