//! Core value types shared across the workspace: severities, actions, threat
//! categories, detections, the analysis result envelope, the detector input
//! context, and the client-facing pending-approval view.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A totally ordered severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; no action implied on its own.
    Low,
    /// Worth recording; rarely actioned alone.
    Medium,
    /// Likely to warrant confirmation or blocking depending on confidence.
    High,
    /// Almost always blocked outright.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// The engine's decision about a tool call.
///
/// `AgentConfirm` is accepted as a wire-level alias for [`Action::Confirm`]
/// at configuration/deserialization boundaries; internally the engine only
/// ever produces `Confirm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Permit the call unconditionally.
    Allow,
    /// Permit the call, but record it.
    Log,
    /// Permit the call, but surface a warning to the caller.
    Warn,
    /// Require an approval (native, agent-confirm, or webhook) before the
    /// call proceeds.
    Confirm,
    /// Refuse the call outright.
    Block,
}

impl Action {
    /// Parse an action, accepting `agent-confirm` as an alias for `confirm`.
    #[must_use]
    pub fn parse_with_alias(s: &str) -> Option<Self> {
        match s {
            "allow" => Some(Action::Allow),
            "log" => Some(Action::Log),
            "warn" => Some(Action::Warn),
            "confirm" | "agent-confirm" => Some(Action::Confirm),
            "block" => Some(Action::Block),
            _ => None,
        }
    }
}

/// The closed set of threat families a detector can classify a finding into,
/// plus `Unknown` for the (currently unreachable from any shipped detector)
/// case of a detection with no specific taxonomy fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatCategory {
    /// Unauthorized or unconfirmed purchases / financial transactions.
    Purchase,
    /// Navigation to or interaction with disallowed websites.
    Website,
    /// Irreversible destructive operations (filesystem, cloud, code).
    Destructive,
    /// Secret material present in a tool call's input or output.
    Secrets,
    /// Data leaving the environment through an uncontrolled channel.
    Exfiltration,
    /// No specific category fit. Excluded from rule-action overrides: no
    /// configuration key targets this variant.
    Unknown,
}

/// One detector's positive finding.
///
/// Invariant: a detector that does not fire never constructs a `Detection` —
/// there is no `detected: bool` field because non-detections are represented
/// by `Option::None` at the call site, not by a false-y value inside this
/// type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Which threat family this finding belongs to.
    pub category: ThreatCategory,
    /// How severe the finding is, independent of confidence.
    pub severity: Severity,
    /// Confidence in `[0, 1]` that this finding is a true positive.
    pub confidence: f64,
    /// Human-readable explanation, suitable for display and audit logs.
    pub reason: String,
    /// Free-form, detector-specific supporting data (matched text, redacted
    /// echoes, sub-detector names).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Detection {
    /// Construct a detection with empty metadata.
    #[must_use]
    pub fn new(
        category: ThreatCategory,
        severity: Severity,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self { category, severity, confidence, reason: reason.into(), metadata: BTreeMap::new() }
    }

    /// Builder-style metadata insertion.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The full envelope returned by `Engine::analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The resolved action for this call.
    pub action: Action,
    /// All detections that fired, sorted descending by `(severity,
    /// confidence)`.
    pub detections: Vec<Detection>,
    /// Transient flag: true while an oracle escalation is in flight for this
    /// result. Always `false` on any result returned to a caller — it is
    /// cleared synchronously once escalation completes or falls back.
    #[serde(default)]
    pub requires_oracle: bool,
    /// Whether this result was served from the fingerprint cache.
    pub cached: bool,
    /// Wall-clock duration of the `analyze` call, in milliseconds.
    pub duration_ms: u64,
    /// Present only when `action == Action::Confirm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_approval: Option<PendingApproval>,
}

impl AnalysisResult {
    /// The highest-ranked detection, if any fired.
    #[must_use]
    pub fn primary_detection(&self) -> Option<&Detection> {
        self.detections.first()
    }
}

/// The input to every pattern detector: a tool call plus optional URL and
/// prior output. Every detector is a pure function of
/// `(toolName, toolInput, optional URL/output)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    /// Name of the tool being invoked.
    pub tool_name: String,
    /// The tool's input parameters, with any reserved confirm parameter
    /// already stripped by the caller.
    pub tool_input: Value,
    /// URL under consideration, when the call is network/browser shaped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Prior tool output, present only on the sanitizer path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl CallContext {
    /// Construct a context with no URL or output.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, tool_input: Value) -> Self {
        Self { tool_name: tool_name.into(), tool_input, url: None, output: None }
    }
}

/// The client-facing view of a pending approval: enough to let a caller
/// decide how to resolve it, nothing about internal ticket storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    /// Ticket identifier; opaque to the client beyond round-tripping it.
    pub id: String,
    /// Seconds remaining until the ticket expires, computed at the moment of
    /// serving (not stored — always freshly derived from `expiresAt`).
    pub expires_in_seconds: u64,
    /// Non-empty subset of the enabled approval methods.
    pub methods: Vec<ApprovalMethod>,
}

/// A way an approval ticket can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalMethod {
    /// Resolved through a first-party UI/API the host provides.
    Native,
    /// Resolved by the agent replaying the call with the ticket id attached.
    AgentConfirm,
    /// Resolved by an external party hitting a configured webhook.
    Webhook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn action_parses_agent_confirm_alias() {
        assert_eq!(Action::parse_with_alias("agent-confirm"), Some(Action::Confirm));
        assert_eq!(Action::parse_with_alias("confirm"), Some(Action::Confirm));
        assert_eq!(Action::parse_with_alias("nonsense"), None);
    }

    #[test]
    fn analysis_result_primary_detection_is_first() {
        let d1 = Detection::new(ThreatCategory::Destructive, Severity::Critical, 0.99, "rm -rf");
        let d2 = Detection::new(ThreatCategory::Secrets, Severity::Low, 0.2, "maybe a key");
        let result = AnalysisResult {
            action: Action::Block,
            detections: vec![d1.clone(), d2],
            requires_oracle: false,
            cached: false,
            duration_ms: 1,
            pending_approval: None,
        };
        assert_eq!(result.primary_detection(), Some(&d1));
    }

    #[test]
    fn detection_serializes_category_lowercase() {
        let d = Detection::new(ThreatCategory::Purchase, Severity::Medium, 0.5, "card charge");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["category"], "purchase");
        assert_eq!(v["severity"], "medium");
    }
}
