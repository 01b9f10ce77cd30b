//! Session-id tracking for `beforeAgentStart`'s at-most-once injection rule.
//!
//! Built on an `Arc<DashSet<String>>` idempotency set, the same "have we
//! already handled this identifier" shape used for concurrent dedup
//! elsewhere in this workspace.

use dashmap::DashSet;

/// Tracks which session ids have already received the system-prompt
/// addition.
#[derive(Clone, Default)]
pub struct SeenSessions {
    ids: std::sync::Arc<DashSet<String>>,
}

impl SeenSessions {
    /// Construct an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `session_id` as seen, returning `true` if this is the first
    /// time it has been observed.
    pub fn mark_first_seen(&self, session_id: &str) -> bool {
        self.ids.insert(session_id.to_string())
    }
}
