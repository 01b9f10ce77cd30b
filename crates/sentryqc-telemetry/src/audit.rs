//! The push-only audit sink.
//!
//! A process-lifetime buffer behind a mutex, drained by the caller. Emission
//! never blocks and never propagates a failure — there is nothing for
//! `emit` to fail at, since it only ever appends to an in-memory buffer, but
//! the non-blocking, never-propagate contract is kept explicit here because
//! a future sink (file, network) must preserve it.

use crate::events::AuditEvent;
use std::sync::{Arc, Mutex};

/// Cheap-to-clone, thread-safe audit event buffer.
///
/// Unlike a single process-global `OnceLock<AuditSink>`, this type is
/// constructed explicitly and passed through the call chain — the approval
/// store, engine, and oracle are all threaded through construction the same
/// way; nothing in this crate reaches for a global singleton.
#[derive(Clone, Default)]
pub struct AuditSink {
    inner: Arc<Mutex<Vec<AuditEvent>>>,
}

impl AuditSink {
    /// Construct an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event`. Never blocks for long (a short-lived mutex guard)
    /// and never returns an error to the caller.
    pub fn emit(&self, event: AuditEvent) {
        let Ok(mut guard) = self.inner.lock() else {
            tracing::error!("audit sink mutex poisoned; dropping event");
            return;
        };
        guard.push(event);
    }

    /// Drain and return every event recorded since the last drain.
    pub fn drain(&self) -> Vec<AuditEvent> {
        let Ok(mut guard) = self.inner.lock() else {
            tracing::error!("audit sink mutex poisoned; returning empty drain");
            return Vec::new();
        };
        std::mem::take(&mut guard)
    }

    /// Number of events currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether the sink currently holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentryqc_core::{Action, Detection, Severity, ThreatCategory};

    #[test]
    fn emit_then_drain_round_trips() {
        let sink = AuditSink::new();
        sink.emit(AuditEvent::Detection {
            tool_name: "bash".to_string(),
            detection: Detection::new(ThreatCategory::Destructive, Severity::Critical, 0.99, "rm -rf /"),
            action: Action::Block,
        });
        assert_eq!(sink.len(), 1);
        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn drain_is_idempotent_empty_after() {
        let sink = AuditSink::new();
        sink.emit(AuditEvent::Expiration { ticket_id: "tk-1".to_string() });
        sink.drain();
        assert!(sink.drain().is_empty());
    }
}
