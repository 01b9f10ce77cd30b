//! Sanitizer tuning: which families are enabled, the confidence floor for
//! acting on a match, and whether matches get replaced in the output.

use crate::models::InjectionFamily;
use sentryqc_core::Action;
use std::collections::BTreeMap;

/// Per-family tuning: on/off, and the action the engine should treat a
/// qualifying match as equivalent to.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Whether this family is scanned at all.
    pub enabled: bool,
    /// The action a qualifying match in this family is equivalent to. Only
    /// `Action::Block` causes the whole-value replacement in
    /// [`crate::walker::sanitize_value`]; other actions are informational
    /// (the match is still recorded and optionally redacted).
    pub action: Action,
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self { enabled: true, action: Action::Block }
    }
}

/// Sanitization configuration, mirroring the persisted `rules.sanitization.*`
/// options.
#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    /// Minimum confidence a match needs before it is actioned.
    pub min_confidence: f64,
    /// Whether matches (that don't trigger a whole-value block) get
    /// replaced by `[REDACTED]` in the returned sanitized string.
    pub redact_matches: bool,
    /// Per-family rules.
    pub categories: BTreeMap<InjectionFamily, CategoryRule>,
    /// Whether encoded-payload extraction and recursive decoding is enabled.
    pub encoded_payload_enabled: bool,
    /// Maximum recursion depth for decoding nested encoded payloads.
    pub max_decode_depth: u32,
    /// Fixed placeholder used when a value is fully replaced due to a
    /// blocking match.
    pub blocked_placeholder: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(InjectionFamily::InstructionOverride, CategoryRule::default());
        categories.insert(InjectionFamily::SystemPromptLeak, CategoryRule::default());
        categories.insert(InjectionFamily::Jailbreak, CategoryRule::default());
        categories.insert(InjectionFamily::EncodedPayload, CategoryRule::default());
        Self {
            min_confidence: 0.7,
            redact_matches: true,
            categories,
            encoded_payload_enabled: true,
            max_decode_depth: 3,
            blocked_placeholder: "[BLOCKED: potential prompt injection]".to_string(),
        }
    }
}

impl SanitizerConfig {
    /// Is `family` enabled for scanning?
    #[must_use]
    pub fn is_enabled(&self, family: InjectionFamily) -> bool {
        self.categories.get(&family).map(|r| r.enabled).unwrap_or(true)
    }

    /// Would a match in `family` at `confidence` trigger a whole-value
    /// block?
    #[must_use]
    pub fn blocks(&self, family: InjectionFamily, confidence: f64) -> bool {
        confidence >= self.min_confidence
            && self.categories.get(&family).map(|r| r.action == Action::Block).unwrap_or(false)
    }
}
