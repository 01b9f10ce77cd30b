//! Per-category detector configuration.
//!
//! This crate does not deserialize YAML itself (that's `sentryqc-config`'s
//! job); it accepts already-parsed plain data and compiles user-supplied
//! regex extensions. Per spec, an invalid user pattern is skipped with a
//! warning rather than aborting detection or failing engine construction —
//! [`compile_user_patterns`] implements that policy once, for every
//! category that accepts `patterns`.

use regex::Regex;
use sentryqc_core::Severity;

/// Compile each pattern, dropping (and logging) any that fail to parse.
///
/// A bad pattern never aborts detection — it is simply absent from the
/// returned list.
#[must_use]
pub fn compile_user_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(pattern = %p, error = %err, "skipping invalid detector pattern");
                None
            }
        })
        .collect()
}

/// Configuration shared by the `secrets` detector.
#[derive(Debug, Clone)]
pub struct SecretsConfig {
    /// Master switch for this category.
    pub enabled: bool,
    /// Overrides the detector's default severity assignment when set.
    pub severity_override: Option<Severity>,
    /// User regex extensions, compiled and appended to the builtin catalogue.
    pub user_patterns: Vec<Regex>,
    /// Whether to also redact/detect plain email addresses. Off by default,
    /// since email addresses are common in legitimate tool calls.
    pub detect_emails: bool,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_override: None,
            user_patterns: Vec::new(),
            detect_emails: false,
        }
    }
}

/// Configuration shared by the `destructive` detector's three sub-detectors.
#[derive(Debug, Clone)]
pub struct DestructiveConfig {
    /// Master switch for this category.
    pub enabled: bool,
    /// Overrides the detector's default severity assignment when set.
    pub severity_override: Option<Severity>,
    /// User regex extensions for the shell sub-detector.
    pub shell_patterns: Vec<Regex>,
    /// User regex extensions for the cloud sub-detector.
    pub cloud_patterns: Vec<Regex>,
    /// User regex extensions for the code sub-detector.
    pub code_patterns: Vec<Regex>,
}

impl Default for DestructiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_override: None,
            shell_patterns: Vec::new(),
            cloud_patterns: Vec::new(),
            code_patterns: Vec::new(),
        }
    }
}

/// Configuration for the `exfiltration` detector's three sub-detectors.
#[derive(Debug, Clone)]
pub struct ExfiltrationConfig {
    /// Master switch for this category.
    pub enabled: bool,
    /// Overrides the detector's default severity assignment when set.
    pub severity_override: Option<Severity>,
    /// Hosts considered already-configured destinations (not flagged as
    /// exfiltration) for the HTTP egress sub-detector.
    pub allowed_hosts: Vec<String>,
}

impl Default for ExfiltrationConfig {
    fn default() -> Self {
        Self { enabled: true, severity_override: None, allowed_hosts: Vec::new() }
    }
}

/// Glob matching mode for the `website` detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteMode {
    /// Only domains in `allowlist` are permitted; everything else is flagged.
    Allowlist,
    /// Domains in `blocklist` are flagged; everything else is permitted.
    Blocklist,
}

/// Configuration for the `website` detector.
#[derive(Debug, Clone)]
pub struct WebsiteConfig {
    /// Master switch for this category.
    pub enabled: bool,
    /// Overrides the detector's default severity assignment when set.
    pub severity_override: Option<Severity>,
    /// Which list governs matching.
    pub mode: WebsiteMode,
    /// Glob patterns permitted under `Allowlist` mode.
    pub allowlist: Vec<String>,
    /// Glob patterns flagged under `Blocklist` mode.
    pub blocklist: Vec<String>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_override: None,
            mode: WebsiteMode::Blocklist,
            allowlist: Vec::new(),
            blocklist: Vec::new(),
        }
    }
}

/// Configuration for the `purchase` detector.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    /// Master switch for this category.
    pub enabled: bool,
    /// Overrides the detector's default severity assignment when set.
    pub severity_override: Option<Severity>,
    /// Maximum amount permitted in a single transaction before flagging.
    pub per_transaction_limit: Option<f64>,
    /// Maximum cumulative amount permitted per day before flagging. Tracked
    /// by the caller (the detector itself is stateless); passed in as the
    /// running total already spent today.
    pub daily_limit: Option<f64>,
    /// Which list governs the domain matcher. In `Allowlist` mode, any host
    /// not on `domain_allowlist` is flagged; in `Blocklist` mode, the
    /// built-in known-payment-domain list plus `domain_blocklist` is
    /// flagged.
    pub domain_mode: WebsiteMode,
    /// Glob patterns permitted under `Allowlist` mode.
    pub domain_allowlist: Vec<String>,
    /// Glob patterns flagged under `Blocklist` mode, in addition to the
    /// built-in known-payment-domain list.
    pub domain_blocklist: Vec<String>,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity_override: None,
            per_transaction_limit: None,
            daily_limit: None,
            domain_mode: WebsiteMode::Blocklist,
            domain_allowlist: Vec::new(),
            domain_blocklist: Vec::new(),
        }
    }
}

/// Aggregate configuration consumed by every detector in this crate.
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    /// Purchase detector settings.
    pub purchase: PurchaseConfig,
    /// Website detector settings.
    pub website: WebsiteConfig,
    /// Destructive detector settings.
    pub destructive: DestructiveConfig,
    /// Secrets detector settings.
    pub secrets: SecretsConfig,
    /// Exfiltration detector settings.
    pub exfiltration: ExfiltrationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_is_dropped_not_fatal() {
        let compiled = compile_user_patterns(&["valid.*".to_string(), "(unclosed".to_string()]);
        assert_eq!(compiled.len(), 1);
    }
}
