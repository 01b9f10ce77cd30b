//! The five audit event kinds the core emits, plus the notification
//! vocabulary built on top of them.

use sentryqc_core::{Action, Detection};
use serde::{Deserialize, Serialize};

/// One audit-worthy occurrence inside the core. Shaped like a single
/// phase/kind/reason audit record, generalized from one policy-decision
/// record to the five event kinds this system emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AuditEvent {
    /// A detector fired during `analyze`.
    Detection {
        /// Name of the tool the call was for.
        tool_name: String,
        /// The detection that fired.
        detection: Detection,
        /// The action resolved for this call.
        action: Action,
    },
    /// An approval ticket was approved.
    Approval {
        /// The resolved ticket id.
        ticket_id: String,
        /// Who approved it (`"agent"` on the fast path, or a host-supplied
        /// identity).
        approved_by: Option<String>,
    },
    /// An approval ticket was denied.
    Denial {
        /// The resolved ticket id.
        ticket_id: String,
    },
    /// A pending ticket expired before resolution.
    Expiration {
        /// The expired ticket id.
        ticket_id: String,
    },
    /// The sanitizer redacted something from a tool result.
    SanitizerHit {
        /// Name of the tool the result came from.
        tool_name: String,
        /// The redaction tags that fired, e.g. `["aws-secret-key"]`.
        redaction_types: Vec<String>,
    },
}

/// An event handed to a [`crate::NotificationSender`]. Distinct from
/// [`AuditEvent`] because not every audit event warrants a human-facing
/// notification (detections below `warn` typically don't); today the two
/// are kept structurally identical, leaving room for that to diverge
/// without an API break.
pub type NotificationEvent = AuditEvent;
