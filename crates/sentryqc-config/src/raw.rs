//! Raw, directly-deserializable mirror of the persisted YAML configuration
//! format. Every struct rejects unknown fields at this layer — there is no
//! looser intermediate representation; a typo in a config file fails to
//! parse rather than silently doing nothing.

use serde::Deserialize;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_parameter_name() -> String {
    "_clawsec_confirm".to_string()
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_oracle_timeout_ms() -> u64 {
    500
}

/// Top-level persisted configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawConfig {
    /// Schema version tag; currently informational only.
    pub version: Option<String>,
    /// Master switch and log level.
    pub global: RawGlobal,
    /// Ordered list of template names merged under this document's values.
    pub extends: Vec<String>,
    /// Per-category detector rules plus sanitization tuning.
    pub rules: RawRules,
    /// Approval method configuration.
    pub approval: RawApproval,
    /// Oracle (LLM) configuration.
    pub llm: RawLlm,
}

/// `global.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawGlobal {
    /// Master on/off switch for the whole engine.
    pub enabled: bool,
    /// One of debug/info/warn/error.
    pub log_level: String,
}

impl Default for RawGlobal {
    fn default() -> Self {
        Self { enabled: true, log_level: default_log_level() }
    }
}

/// `rules.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawRules {
    /// `rules.purchase.*`
    pub purchase: RawPurchaseRule,
    /// `rules.website.*`
    pub website: RawWebsiteRule,
    /// `rules.destructive.*`
    pub destructive: RawCategoryRule,
    /// `rules.secrets.*`
    pub secrets: RawSecretsRule,
    /// `rules.exfiltration.*`
    pub exfiltration: RawExfiltrationRule,
    /// `rules.shell.patterns`
    pub shell: RawPatternsOnly,
    /// `rules.cloud.patterns`
    pub cloud: RawPatternsOnly,
    /// `rules.code.patterns`
    pub code: RawPatternsOnly,
    /// `rules.sanitization.*`
    pub sanitization: RawSanitization,
}

/// Shared shape for categories that only need `enabled`/`severity`/`action`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawCategoryRule {
    /// Per-category switch. `None` means "use the detector's default".
    pub enabled: Option<bool>,
    /// Severity assigned to this category's detections, when overridden.
    pub severity: Option<String>,
    /// Explicit action override for the resolver, when set.
    pub action: Option<String>,
}

/// `rules.purchase.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawPurchaseRule {
    /// Per-category switch.
    pub enabled: Option<bool>,
    /// Severity assigned to this category's detections, when overridden.
    pub severity: Option<String>,
    /// Explicit action override for the resolver, when set.
    pub action: Option<String>,
    /// `rules.purchase.spendLimits.*`
    pub spend_limits: RawSpendLimits,
}

/// `rules.purchase.spendLimits.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawSpendLimits {
    /// Maximum amount permitted in a single transaction.
    pub per_transaction: Option<f64>,
    /// Maximum cumulative amount permitted per day.
    pub daily: Option<f64>,
}

/// `rules.website.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawWebsiteRule {
    /// Per-category switch.
    pub enabled: Option<bool>,
    /// Severity assigned to this category's detections, when overridden.
    pub severity: Option<String>,
    /// Explicit action override for the resolver, when set.
    pub action: Option<String>,
    /// `allowlist` or `blocklist`.
    pub mode: Option<String>,
    /// Glob patterns permitted under allowlist mode.
    pub allowlist: Vec<String>,
    /// Glob patterns flagged under blocklist mode.
    pub blocklist: Vec<String>,
}

/// `rules.secrets.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawSecretsRule {
    /// Per-category switch.
    pub enabled: Option<bool>,
    /// Severity assigned to this category's detections, when overridden.
    pub severity: Option<String>,
    /// Explicit action override for the resolver, when set.
    pub action: Option<String>,
    /// User regex extensions appended to the builtin catalogue.
    pub patterns: Vec<String>,
    /// Whether to also flag plain email addresses (off unless opted in).
    pub detect_emails: Option<bool>,
}

/// `rules.exfiltration.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawExfiltrationRule {
    /// Per-category switch.
    pub enabled: Option<bool>,
    /// Severity assigned to this category's detections, when overridden.
    pub severity: Option<String>,
    /// Explicit action override for the resolver, when set.
    pub action: Option<String>,
    /// Hosts treated as already-configured destinations, not exfiltration.
    pub allowed_hosts: Vec<String>,
}

/// `rules.{shell,cloud,code}.patterns`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawPatternsOnly {
    /// User regex extensions for this sub-detector.
    pub patterns: Vec<String>,
}

/// `rules.sanitization.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawSanitization {
    /// Minimum confidence a match needs before it is actioned.
    pub min_confidence: f64,
    /// Whether non-blocking matches get replaced by `[REDACTED]` in output.
    pub redact_matches: bool,
    /// Per-family overrides, keyed by family tag
    /// (`instruction-override`/`system-prompt-leak`/`jailbreak`/`encoded-payload`).
    pub categories: BTreeMap<String, RawCategoryRule>,
    /// Default action applied to every family not listed in `categories`.
    pub action: Option<String>,
}

impl Default for RawSanitization {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            redact_matches: true,
            categories: BTreeMap::new(),
            action: None,
        }
    }
}

/// `approval.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawApproval {
    /// `approval.native.*`
    pub native: RawNative,
    /// `approval.agentConfirm.*`
    pub agent_confirm: RawAgentConfirm,
    /// `approval.webhook.*`
    pub webhook: RawWebhook,
}

/// `approval.native.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawNative {
    /// Whether the native (first-party UI/API) approval method is enabled.
    pub enabled: bool,
    /// Ticket lifetime, in seconds.
    pub timeout: u64,
}

impl Default for RawNative {
    fn default() -> Self {
        Self { enabled: true, timeout: default_timeout_seconds() }
    }
}

/// `approval.agentConfirm.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawAgentConfirm {
    /// Whether the agent-confirm fast path is enabled.
    pub enabled: bool,
    /// Name of the reserved tool-input parameter carrying a ticket id.
    pub parameter_name: String,
}

impl Default for RawAgentConfirm {
    fn default() -> Self {
        Self { enabled: true, parameter_name: default_parameter_name() }
    }
}

/// `approval.webhook.*`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawWebhook {
    /// Whether the webhook approval method is enabled.
    pub enabled: bool,
    /// URL notified of new pending approvals.
    pub url: Option<String>,
    /// Request timeout, in seconds.
    pub timeout: Option<u64>,
    /// Extra headers sent with the webhook request.
    pub headers: BTreeMap<String, String>,
}

/// `llm.*`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default, rename_all = "camelCase")]
pub struct RawLlm {
    /// Whether the oracle may be consulted at all.
    pub enabled: bool,
    /// Model identifier, passed through to the oracle client unmodified.
    pub model: Option<String>,
    /// Per-call deadline, in milliseconds. Documented elsewhere as "default
    /// 500ms, configurable"; this crate adds the key under `llm` since that
    /// is its natural home and leaving it unconfigurable would contradict
    /// "configurable".
    pub timeout_ms: u64,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { enabled: false, model: None, timeout_ms: default_oracle_timeout_ms() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_parses_to_defaults() {
        let raw: RawConfig = serde_yaml::from_str("{}").unwrap();
        assert!(raw.global.enabled);
        assert_eq!(raw.global.log_level, "info");
        assert_eq!(raw.approval.agent_confirm.parameter_name, "_clawsec_confirm");
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        let result: Result<RawConfig, _> = serde_yaml::from_str("bogusField: true");
        assert!(result.is_err());
    }

    #[test]
    fn camel_case_fields_parse() {
        let yaml = r"
rules:
  purchase:
    spendLimits:
      perTransaction: 100.0
      daily: 500.0
approval:
  agentConfirm:
    parameterName: custom_param
";
        let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.rules.purchase.spend_limits.per_transaction, Some(100.0));
        assert_eq!(raw.approval.agent_confirm.parameter_name, "custom_param");
    }
}
