//! Agent-confirm fast path: the engine checks
//! `toolInput[confirmParameterName]` before running any detector. Presenting
//! a valid pending ticket is authorization, not identity — the detection
//! pipeline never runs on this path.

use crate::store::ApprovalStore;
use serde_json::Value;

/// Outcome of checking a tool call for an agent-confirm parameter.
#[derive(Clone)]
pub enum FastPathOutcome {
    /// The parameter was absent; proceed with the normal detection path.
    NotPresent,
    /// A ticket was validated and approved; `stripped_input` has the
    /// confirm parameter removed and should replace the original input.
    Allowed {
        /// The tool input with the confirm parameter removed.
        stripped_input: Value,
    },
    /// The parameter was present but invalid in some way (empty, unknown
    /// ticket, expired, or already resolved). The call must be blocked.
    Blocked {
        /// Human-readable reason, suitable for display.
        reason: String,
    },
}

/// Check `tool_input` for the reserved confirm parameter named
/// `parameter_name` and resolve it against `store`.
pub fn check(store: &ApprovalStore, tool_input: &Value, parameter_name: &str) -> FastPathOutcome {
    let Some(raw) = tool_input.get(parameter_name) else {
        return FastPathOutcome::NotPresent;
    };

    let Some(ticket_id) = raw.as_str().filter(|s| !s.is_empty()) else {
        return FastPathOutcome::Blocked {
            reason: format!("{parameter_name} was present but was not a non-empty string"),
        };
    };

    match store.approve(ticket_id, Some("agent")) {
        Ok(_ticket) => {
            let mut stripped = tool_input.clone();
            if let Some(map) = stripped.as_object_mut() {
                map.remove(parameter_name);
            }
            FastPathOutcome::Allowed { stripped_input: stripped }
        }
        Err(err) => FastPathOutcome::Blocked { reason: err.to_string() },
    }
}


impl std::fmt::Debug for FastPathOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FastPathOutcome::NotPresent => write!(f, "NotPresent"),
            FastPathOutcome::Allowed { stripped_input } => {
                write!(f, "Allowed {{ stripped_input: {stripped_input} }}")
            }
            FastPathOutcome::Blocked { reason } => write!(f, "Blocked {{ reason: {reason:?} }}"),
        }
    }
}
