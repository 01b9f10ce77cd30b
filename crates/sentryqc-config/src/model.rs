//! The validated, typed configuration the rest of the workspace consumes.
//!
//! [`EngineConfig`] is what `sentryqc-engine::Engine` is constructed from
//! (wrapped in an `Arc` by the caller, since detector configuration is
//! effectively immutable after engine construction — a caller that wants to
//! reconfigure swaps the `Arc<Engine>` atomically rather than mutating one
//! in place).

use sentryqc_core::{Action, ThreatCategory};
use sentryqc_detectors::DetectorConfig;
use sentryqc_sanitizer::SanitizerConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// `approval.native.*`
#[derive(Debug, Clone)]
pub struct NativeApprovalConfig {
    /// Whether the native approval method is enabled.
    pub enabled: bool,
    /// Ticket lifetime.
    pub timeout: Duration,
}

/// `approval.agentConfirm.*`
#[derive(Debug, Clone)]
pub struct AgentConfirmConfig {
    /// Whether the agent-confirm fast path is enabled.
    pub enabled: bool,
    /// Name of the reserved tool-input parameter carrying a ticket id.
    pub parameter_name: String,
}

/// `approval.webhook.*`
#[derive(Debug, Clone)]
pub struct WebhookApprovalConfig {
    /// Whether the webhook approval method is enabled. Per the
    /// `PendingApproval.methods` rule, this is only ever surfaced as an
    /// available method when `enabled` AND `url` is set.
    pub enabled: bool,
    /// Target URL, if configured.
    pub url: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra headers sent with the webhook request.
    pub headers: BTreeMap<String, String>,
}

impl WebhookApprovalConfig {
    /// Whether this method should be advertised to a caller as currently
    /// usable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && self.url.is_some()
    }
}

/// `approval.*`
#[derive(Debug, Clone)]
pub struct ApprovalConfig {
    /// `approval.native.*`
    pub native: NativeApprovalConfig,
    /// `approval.agentConfirm.*`
    pub agent_confirm: AgentConfirmConfig,
    /// `approval.webhook.*`
    pub webhook: WebhookApprovalConfig,
}

/// `llm.*`
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Whether the oracle may be consulted at all.
    pub enabled: bool,
    /// Model identifier, passed through to the oracle client unmodified.
    pub model: Option<String>,
    /// Per-call deadline.
    pub timeout: Duration,
}

/// The fully validated, ready-to-use engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Master switch; when `false`, `Engine::analyze` short-circuits to
    /// `allow` with no detections.
    pub global_enabled: bool,
    /// One of debug/info/warn/error; informational for this workspace's
    /// `tracing` setup (see `sentryqc-telemetry::init_json_logging`).
    pub log_level: String,
    /// Detector tuning for all five families.
    pub detectors: DetectorConfig,
    /// Sanitizer tuning.
    pub sanitizer: SanitizerConfig,
    /// Explicit per-category action overrides: if the configuration for
    /// `primary.category` specifies an explicit action, it is used verbatim
    /// instead of the confidence table. `ThreatCategory::Unknown` can never
    /// appear here — no configuration key targets it.
    pub rule_action_overrides: BTreeMap<ThreatCategory, Action>,
    /// Approval method configuration.
    pub approval: ApprovalConfig,
    /// Oracle configuration.
    pub llm: LlmConfig,
}

impl EngineConfig {
    /// The explicit action configured for `category`, if any.
    #[must_use]
    pub fn action_override_for(&self, category: ThreatCategory) -> Option<Action> {
        if category == ThreatCategory::Unknown {
            return None;
        }
        self.rule_action_overrides.get(&category).copied()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_enabled: true,
            log_level: "info".to_string(),
            detectors: DetectorConfig::default(),
            sanitizer: SanitizerConfig::default(),
            rule_action_overrides: BTreeMap::new(),
            approval: ApprovalConfig {
                native: NativeApprovalConfig { enabled: true, timeout: Duration::from_secs(300) },
                agent_confirm: AgentConfirmConfig {
                    enabled: true,
                    parameter_name: "_clawsec_confirm".to_string(),
                },
                webhook: WebhookApprovalConfig {
                    enabled: false,
                    url: None,
                    timeout: Duration::from_secs(10),
                    headers: BTreeMap::new(),
                },
            },
            llm: LlmConfig { enabled: false, model: None, timeout: Duration::from_millis(500) },
        }
    }
}
