use almanac_core::audit::{AuditEvent, AuditOutcome, AuditSink};
use tracing::{info, warn};

/// Writes audit events into the structured log stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        let metadata = serde_json::to_string(&event.metadata).unwrap_or_default();
        match event.outcome {
            AuditOutcome::Success => info!(
                event_name = %event.event_type,
                audit_event_id = %event.event_id,
                correlation_id = %event.correlation_id,
                chat_id = event.chat_id.as_deref().unwrap_or("unknown"),
                actor = %event.actor,
                category = ?event.category,
                metadata = %metadata,
                "audit event"
            ),
            AuditOutcome::Rejected | AuditOutcome::Failed => warn!(
                event_name = %event.event_type,
                audit_event_id = %event.event_id,
                correlation_id = %event.correlation_id,
                chat_id = event.chat_id.as_deref().unwrap_or("unknown"),
                actor = %event.actor,
                category = ?event.category,
                outcome = ?event.outcome,
                metadata = %metadata,
                "audit event"
            ),
        }
    }
}
