//! Ticket types: the state machine, the stored record, and the client view.

use sentryqc_core::{ApprovalMethod, Detection, PendingApproval};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal-once status of an approval ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Awaiting resolution.
    Pending,
    /// Resolved affirmatively. Terminal.
    Approved,
    /// Resolved negatively. Terminal.
    Denied,
    /// Resolved by wall-clock expiry. Terminal.
    Expired,
}

impl TicketStatus {
    /// Is this a terminal (non-`Pending`) status?
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, TicketStatus::Pending)
    }
}

/// A stored approval ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalTicket {
    /// Unguessable 128-bit, URL-safe identifier.
    pub id: String,
    /// Milliseconds since epoch at creation.
    pub created_at: u64,
    /// Milliseconds since epoch after which the ticket is considered
    /// expired.
    pub expires_at: u64,
    /// The detection that caused this ticket to be created.
    pub detection: Detection,
    /// A snapshot of the tool call under approval (confirm parameter, if
    /// any, already stripped).
    pub tool_call_snapshot: Value,
    /// Current status.
    pub status: TicketStatus,
    /// Who resolved it, if resolved (`"agent"` for the fast path).
    pub approved_by: Option<String>,
    /// When it was resolved, if resolved.
    pub approved_at: Option<u64>,
}

impl ApprovalTicket {
    /// Build the client-facing [`PendingApproval`] view, computing
    /// `expiresInSeconds` freshly from `expiresAt` relative to `now_ms`.
    #[must_use]
    pub fn pending_view(&self, now_ms: u64, methods: Vec<ApprovalMethod>) -> PendingApproval {
        let remaining = self.expires_at.saturating_sub(now_ms) / 1000;
        PendingApproval { id: self.id.clone(), expires_in_seconds: remaining, methods }
    }
}
