//! Persistence seam for dispatched envelopes.

pub mod file;

pub use file::FileHistorySink;

use crate::entities::OutboundEnvelope;

/// Durable log for every envelope the dispatcher broadcasts.
///
/// `record` is fire-and-forget from the dispatcher's perspective:
/// implementations log their own failures and never propagate them, so a
/// broken sink cannot block or fail delivery to live recipients.
pub trait PersistenceSink: Send + Sync {
    fn record(&self, envelope: &OutboundEnvelope);
}

/// Sink that drops everything. For deployments that disable history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl PersistenceSink for NoopSink {
    fn record(&self, _envelope: &OutboundEnvelope) {}
}
