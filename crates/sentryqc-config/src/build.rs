//! Raw-to-validated conversion: parses severities/actions, compiles user
//! regex extensions (invalid ones are dropped with a warning, never fatal),
//! and rejects anything that can't be made sense of as a configuration
//! error (fatal, prevents engine construction).

use crate::model::{
    AgentConfirmConfig, ApprovalConfig, EngineConfig, LlmConfig, NativeApprovalConfig,
    WebhookApprovalConfig,
};
use crate::raw::{RawCategoryRule, RawConfig};
use sentryqc_core::{Action, Severity, ThreatCategory};
use sentryqc_detectors::config::{
    compile_user_patterns, DestructiveConfig, ExfiltrationConfig, PurchaseConfig, SecretsConfig,
    WebsiteConfig, WebsiteMode,
};
use sentryqc_detectors::DetectorConfig;
use sentryqc_sanitizer::config::CategoryRule;
use sentryqc_sanitizer::{InjectionFamily, SanitizerConfig};
use std::collections::BTreeMap;
use std::time::Duration;

fn parse_severity(raw: &Option<String>, field: &str) -> Result<Option<Severity>, String> {
    let Some(s) = raw else { return Ok(None) };
    match s.as_str() {
        "low" => Ok(Some(Severity::Low)),
        "medium" => Ok(Some(Severity::Medium)),
        "high" => Ok(Some(Severity::High)),
        "critical" => Ok(Some(Severity::Critical)),
        other => Err(format!("{field} has invalid severity {other:?}; expected low|medium|high|critical")),
    }
}

fn parse_action(raw: &Option<String>, field: &str) -> Result<Option<Action>, String> {
    let Some(s) = raw else { return Ok(None) };
    Action::parse_with_alias(s)
        .map(Some)
        .ok_or_else(|| format!("{field} has invalid action {s:?}"))
}

fn parse_injection_family(tag: &str) -> Option<InjectionFamily> {
    match tag {
        "instruction-override" => Some(InjectionFamily::InstructionOverride),
        "system-prompt-leak" => Some(InjectionFamily::SystemPromptLeak),
        "jailbreak" => Some(InjectionFamily::Jailbreak),
        "encoded-payload" => Some(InjectionFamily::EncodedPayload),
        _ => None,
    }
}

/// Validate `raw` and build a ready-to-use [`EngineConfig`].
///
/// Returns a human-readable error string on the first validation failure
/// encountered, matching the established `load_from_yaml_path` convention of
/// `Result<_, String>` for configuration load failures.
pub fn build(raw: RawConfig) -> Result<EngineConfig, String> {
    let mut overrides: BTreeMap<ThreatCategory, Action> = BTreeMap::new();

    // purchase
    let purchase_severity = parse_severity(&raw.rules.purchase.severity, "rules.purchase.severity")?;
    if let Some(action) = parse_action(&raw.rules.purchase.action, "rules.purchase.action")? {
        overrides.insert(ThreatCategory::Purchase, action);
    }
    let purchase = PurchaseConfig {
        enabled: raw.rules.purchase.enabled.unwrap_or(true),
        severity_override: purchase_severity,
        per_transaction_limit: raw.rules.purchase.spend_limits.per_transaction,
        daily_limit: raw.rules.purchase.spend_limits.daily,
        ..PurchaseConfig::default()
    };

    // website
    let website_severity = parse_severity(&raw.rules.website.severity, "rules.website.severity")?;
    if let Some(action) = parse_action(&raw.rules.website.action, "rules.website.action")? {
        overrides.insert(ThreatCategory::Website, action);
    }
    let mode = match raw.rules.website.mode.as_deref() {
        None | Some("blocklist") => WebsiteMode::Blocklist,
        Some("allowlist") => WebsiteMode::Allowlist,
        Some(other) => {
            return Err(format!("rules.website.mode has invalid value {other:?}; expected allowlist|blocklist"))
        }
    };
    let website = WebsiteConfig {
        enabled: raw.rules.website.enabled.unwrap_or(true),
        severity_override: website_severity,
        mode,
        allowlist: raw.rules.website.allowlist,
        blocklist: raw.rules.website.blocklist,
    };

    // destructive (enabled/severity/action only; patterns live under shell/cloud/code)
    let destructive_severity =
        parse_severity(&raw.rules.destructive.severity, "rules.destructive.severity")?;
    if let Some(action) = parse_action(&raw.rules.destructive.action, "rules.destructive.action")? {
        overrides.insert(ThreatCategory::Destructive, action);
    }
    let destructive = DestructiveConfig {
        enabled: raw.rules.destructive.enabled.unwrap_or(true),
        severity_override: destructive_severity,
        shell_patterns: compile_user_patterns(&raw.rules.shell.patterns),
        cloud_patterns: compile_user_patterns(&raw.rules.cloud.patterns),
        code_patterns: compile_user_patterns(&raw.rules.code.patterns),
    };

    // secrets
    let secrets_severity = parse_severity(&raw.rules.secrets.severity, "rules.secrets.severity")?;
    if let Some(action) = parse_action(&raw.rules.secrets.action, "rules.secrets.action")? {
        overrides.insert(ThreatCategory::Secrets, action);
    }
    let secrets = SecretsConfig {
        enabled: raw.rules.secrets.enabled.unwrap_or(true),
        severity_override: secrets_severity,
        user_patterns: compile_user_patterns(&raw.rules.secrets.patterns),
        detect_emails: raw.rules.secrets.detect_emails.unwrap_or(false),
    };

    // exfiltration
    let exfiltration_severity =
        parse_severity(&raw.rules.exfiltration.severity, "rules.exfiltration.severity")?;
    if let Some(action) = parse_action(&raw.rules.exfiltration.action, "rules.exfiltration.action")? {
        overrides.insert(ThreatCategory::Exfiltration, action);
    }
    let exfiltration = ExfiltrationConfig {
        enabled: raw.rules.exfiltration.enabled.unwrap_or(true),
        severity_override: exfiltration_severity,
        allowed_hosts: raw.rules.exfiltration.allowed_hosts,
    };

    let detectors = DetectorConfig { purchase, website, destructive, secrets, exfiltration };

    // sanitization
    let default_sanitize_action =
        parse_action(&raw.rules.sanitization.action, "rules.sanitization.action")?.unwrap_or(Action::Block);
    let mut categories: BTreeMap<InjectionFamily, CategoryRule> = BTreeMap::new();
    for family in [
        InjectionFamily::InstructionOverride,
        InjectionFamily::SystemPromptLeak,
        InjectionFamily::Jailbreak,
        InjectionFamily::EncodedPayload,
    ] {
        categories.insert(family, CategoryRule { enabled: true, action: default_sanitize_action });
    }
    for (tag, rule) in &raw.rules.sanitization.categories {
        let family = parse_injection_family(tag)
            .ok_or_else(|| format!("rules.sanitization.categories has unknown family {tag:?}"))?;
        apply_category_override(&mut categories, family, rule)?;
    }
    let sanitizer = SanitizerConfig {
        min_confidence: raw.rules.sanitization.min_confidence,
        redact_matches: raw.rules.sanitization.redact_matches,
        categories,
        encoded_payload_enabled: true,
        max_decode_depth: 3,
        blocked_placeholder: "[BLOCKED: potential prompt injection]".to_string(),
    };

    // approval
    let approval = ApprovalConfig {
        native: NativeApprovalConfig {
            enabled: raw.approval.native.enabled,
            timeout: Duration::from_secs(raw.approval.native.timeout),
        },
        agent_confirm: AgentConfirmConfig {
            enabled: raw.approval.agent_confirm.enabled,
            parameter_name: non_empty(raw.approval.agent_confirm.parameter_name, "approval.agentConfirm.parameterName")?,
        },
        webhook: WebhookApprovalConfig {
            enabled: raw.approval.webhook.enabled,
            url: raw.approval.webhook.url,
            timeout: Duration::from_secs(raw.approval.webhook.timeout.unwrap_or(10)),
            headers: raw.approval.webhook.headers,
        },
    };

    let llm = LlmConfig {
        enabled: raw.llm.enabled,
        model: raw.llm.model,
        timeout: Duration::from_millis(raw.llm.timeout_ms),
    };

    Ok(EngineConfig {
        global_enabled: raw.global.enabled,
        log_level: validate_log_level(raw.global.log_level)?,
        detectors,
        sanitizer,
        rule_action_overrides: overrides,
        approval,
        llm,
    })
}

fn apply_category_override(
    categories: &mut BTreeMap<InjectionFamily, CategoryRule>,
    family: InjectionFamily,
    raw: &RawCategoryRule,
) -> Result<(), String> {
    let entry = categories.entry(family).or_insert(CategoryRule { enabled: true, action: Action::Block });
    if let Some(enabled) = raw.enabled {
        entry.enabled = enabled;
    }
    if let Some(action) = parse_action(&raw.action, "rules.sanitization.categories.*.action")? {
        entry.action = action;
    }
    Ok(())
}

fn non_empty(value: String, field: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(value)
    }
}

fn validate_log_level(level: String) -> Result<String, String> {
    match level.as_str() {
        "debug" | "info" | "warn" | "error" => Ok(level),
        other => Err(format!("global.logLevel has invalid value {other:?}; expected debug|info|warn|error")),
    }
}
