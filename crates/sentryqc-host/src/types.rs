//! Hook context/result vocabulary, independent of any particular host
//! runtime.

use sentryqc_core::{Action, Severity, ThreatCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sentryqc_sanitizer::Redaction;

/// Input to `beforeAgentStart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeforeAgentStartContext {
    /// Host-assigned session identifier; used to suppress re-injection of
    /// the system-prompt addition within the same session.
    pub session_id: String,
}

/// Output of `beforeAgentStart`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeforeAgentStartResult {
    /// Natural-language summary of enabled rules and the current
    /// `confirmParameterName`, present only the first time this session id
    /// is seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_addition: Option<String>,
}

/// Input to `beforeToolCall`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeforeToolCallContext {
    /// Host-assigned session identifier.
    pub session_id: String,
    /// Name of the tool about to be invoked.
    pub tool_name: String,
    /// The tool's input parameters as the agent proposed them.
    pub tool_input: Value,
}

/// Host-facing audit metadata for one `beforeToolCall` decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeforeToolCallMetadata {
    /// Threat family of the primary detection, if any fired.
    pub category: ThreatCategory,
    /// Severity of the primary detection.
    pub severity: Severity,
    /// Name of the configuration rule that produced this action, if the
    /// action came from an explicit `rules.<category>.action` override
    /// rather than the confidence table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Human-readable explanation, echoing the primary detection's reason.
    pub reason: String,
}

/// Output of `beforeToolCall`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeforeToolCallResult {
    /// Whether the call must not proceed as-is (covers both `block` and
    /// `confirm`, since in both cases the agent cannot simply continue).
    pub block: bool,
    /// Human-readable reason, present whenever `block` is `true`. For a
    /// `confirm` action this names the approval ticket id and the
    /// resolution methods available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    /// Replacement tool input. Present whenever it differs from what was
    /// passed in — in practice, only on the agent-confirm fast path, where
    /// the confirm parameter has been stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Audit metadata, present whenever at least one detector fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BeforeToolCallMetadata>,
}

impl BeforeToolCallResult {
    /// The no-op allow result: call proceeds unchanged, nothing to report.
    #[must_use]
    pub fn allow() -> Self {
        Self { block: false, block_reason: None, params: None, metadata: None }
    }
}

/// Input to `toolResultPersist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultPersistContext {
    /// Host-assigned session identifier.
    pub session_id: String,
    /// Name of the tool that produced this output.
    pub tool_name: String,
    /// The raw tool output about to be persisted / shown to the agent.
    pub output: Value,
}

/// A persisted message after sanitization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMessage {
    /// The sanitized content, present whenever sanitization changed
    /// anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// What was redacted, present whenever `content` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redactions: Option<Vec<Redaction>>,
}

/// Output of `toolResultPersist`. An empty `message` means "pass through
/// unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResultPersistResult {
    /// Present only when sanitization changed the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<PersistedMessage>,
}

pub(crate) fn action_requires_block(action: Action) -> bool {
    matches!(action, Action::Block | Action::Confirm)
}
