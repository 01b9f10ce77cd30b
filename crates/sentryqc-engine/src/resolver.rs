//! The action resolver and oracle override mapping.
//!
//! Pure functions: no I/O, no shared state. `sentryqc-engine::Engine` is the
//! only caller.

use sentryqc_config::EngineConfig;
use sentryqc_core::{Action, Detection, Severity};
use sentryqc_oracle::{Determination, OracleResponse};

/// Outcome of the action resolver: the provisional action plus whether an
/// oracle escalation is warranted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The provisional action, before any oracle override.
    pub action: Action,
    /// Whether this resolution calls for oracle escalation, gated further
    /// by whether the oracle is enabled and available at runtime.
    pub requires_oracle: bool,
}

impl Resolution {
    fn new(action: Action, requires_oracle: bool) -> Self {
        Self { action, requires_oracle }
    }
}

/// Resolve the action for a sorted, non-empty-or-empty detection list.
///
/// `detections` must already be sorted descending by `(severity,
/// confidence)` with ties broken by category name — the caller
/// (`Engine::analyze`) owns that sort; this function only reads
/// `detections.first()`.
#[must_use]
pub fn resolve(detections: &[Detection], config: &EngineConfig) -> Resolution {
    let Some(primary) = detections.first() else {
        return Resolution::new(Action::Allow, false);
    };

    if let Some(explicit) = config.action_override_for(primary.category) {
        return Resolution::new(explicit, false);
    }

    confidence_table(primary.severity, primary.confidence)
}

/// The severity/confidence table mapping a primary detection to a
/// provisional action.
fn confidence_table(severity: Severity, confidence: f64) -> Resolution {
    match severity {
        Severity::Critical => {
            if confidence > 0.8 {
                Resolution::new(Action::Block, false)
            } else if confidence >= 0.5 {
                Resolution::new(Action::Confirm, true)
            } else {
                Resolution::new(Action::Confirm, false)
            }
        }
        Severity::High => {
            if confidence > 0.7 {
                Resolution::new(Action::Confirm, false)
            } else if confidence >= 0.5 {
                Resolution::new(Action::Warn, true)
            } else {
                Resolution::new(Action::Warn, false)
            }
        }
        Severity::Medium => {
            if (0.5..=0.8).contains(&confidence) {
                Resolution::new(Action::Warn, true)
            } else {
                Resolution::new(Action::Warn, false)
            }
        }
        Severity::Low => Resolution::new(Action::Allow, false),
    }
}

/// Whether escalation should actually happen once oracle availability is
/// known. A resolution that calls for escalation but has no usable oracle
/// collapses to its non-escalating variant — the action itself is
/// unaffected, only `requires_oracle` changes.
#[must_use]
pub fn gate_escalation(resolution: Resolution, oracle_enabled: bool, oracle_available: bool) -> Resolution {
    if resolution.requires_oracle && oracle_enabled && oracle_available {
        resolution
    } else {
        Resolution::new(resolution.action, false)
    }
}

/// Apply the oracle's suggestion on top of the pattern-based action.
///
/// A malformed/timed-out/erroring response is represented, at the trait
/// boundary, by the oracle client's own canonical `{uncertain, 0.5,
/// confirm}` fallback ([`OracleResponse::uncertain`]) — the trait is
/// infallible (see `sentryqc-oracle::client`), so this is the only signal
/// the engine has that the call didn't produce a real judgment. That case
/// must leave the pattern-based action untouched rather than being treated
/// as an honest "suggest confirm" judgment, so it is checked first and
/// short-circuits the rest of the mapping.
#[must_use]
pub fn apply_oracle_override(pattern_action: Action, response: &OracleResponse) -> Action {
    if is_fallback_response(response) {
        return pattern_action;
    }
    match response.suggested_action {
        Action::Block => Action::Block,
        Action::Confirm => Action::Confirm,
        Action::Allow => {
            if response.confidence >= 0.7 {
                Action::Allow
            } else {
                Action::Warn
            }
        }
        // The oracle's suggested_action is only ever block/confirm/allow by
        // contract; any other value is treated the same as the fallback —
        // keep the pattern-based action untouched.
        _ => pattern_action,
    }
}

/// Does `response` represent the canonical uncertain fallback used for
/// timeout/transport/malformed failures, as opposed to a genuine oracle
/// judgment? See [`apply_oracle_override`] for why this distinction
/// matters.
#[must_use]
pub fn is_fallback_response(response: &OracleResponse) -> bool {
    matches!(response.determination, Determination::Uncertain)
        && (response.confidence - 0.5).abs() < 1e-9
        && response.suggested_action == Action::Confirm
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentryqc_core::ThreatCategory;

    fn detection(category: ThreatCategory, severity: Severity, confidence: f64) -> Detection {
        Detection::new(category, severity, confidence, "test")
    }

    #[test]
    fn empty_detections_allow() {
        let config = EngineConfig::default();
        let resolution = resolve(&[], &config);
        assert_eq!(resolution.action, Action::Allow);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn critical_high_confidence_blocks_no_escalation() {
        let resolution = confidence_table(Severity::Critical, 0.95);
        assert_eq!(resolution.action, Action::Block);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn critical_ambiguous_confirms_and_escalates() {
        let resolution = confidence_table(Severity::Critical, 0.65);
        assert_eq!(resolution.action, Action::Confirm);
        assert!(resolution.requires_oracle);
    }

    #[test]
    fn critical_low_confidence_confirms_without_escalation() {
        let resolution = confidence_table(Severity::Critical, 0.3);
        assert_eq!(resolution.action, Action::Confirm);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn high_strong_confidence_confirms_no_escalation() {
        let resolution = confidence_table(Severity::High, 0.75);
        assert_eq!(resolution.action, Action::Confirm);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn high_ambiguous_warns_and_escalates() {
        let resolution = confidence_table(Severity::High, 0.6);
        assert_eq!(resolution.action, Action::Warn);
        assert!(resolution.requires_oracle);
    }

    #[test]
    fn medium_ambiguous_band_escalates() {
        let resolution = confidence_table(Severity::Medium, 0.6);
        assert_eq!(resolution.action, Action::Warn);
        assert!(resolution.requires_oracle);
    }

    #[test]
    fn low_severity_always_allows() {
        let resolution = confidence_table(Severity::Low, 0.99);
        assert_eq!(resolution.action, Action::Allow);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn explicit_config_action_wins_over_confidence_table() {
        let mut config = EngineConfig::default();
        config.rule_action_overrides.insert(ThreatCategory::Destructive, Action::Confirm);
        let detections = vec![detection(ThreatCategory::Destructive, Severity::Critical, 0.99)];
        let resolution = resolve(&detections, &config);
        assert_eq!(resolution.action, Action::Confirm);
        assert!(!resolution.requires_oracle);
    }

    #[test]
    fn escalation_gate_collapses_when_oracle_unavailable() {
        let resolution = Resolution::new(Action::Confirm, true);
        let gated = gate_escalation(resolution, true, false);
        assert_eq!(gated.action, Action::Confirm);
        assert!(!gated.requires_oracle);
    }

    #[test]
    fn escalation_gate_passes_when_oracle_enabled_and_available() {
        let resolution = Resolution::new(Action::Confirm, true);
        let gated = gate_escalation(resolution, true, true);
        assert!(gated.requires_oracle);
    }

    #[test]
    fn oracle_allow_below_threshold_becomes_warn() {
        let response = OracleResponse {
            determination: Determination::Safe,
            confidence: 0.6,
            reasoning: "borderline".into(),
            suggested_action: Action::Allow,
        };
        assert_eq!(apply_oracle_override(Action::Confirm, &response), Action::Warn);
    }

    #[test]
    fn oracle_allow_above_threshold_becomes_allow() {
        let response = OracleResponse {
            determination: Determination::Safe,
            confidence: 0.9,
            reasoning: "clearly fine".into(),
            suggested_action: Action::Allow,
        };
        assert_eq!(apply_oracle_override(Action::Confirm, &response), Action::Allow);
    }

    #[test]
    fn oracle_block_always_wins() {
        let response = OracleResponse {
            determination: Determination::Threat,
            confidence: 0.99,
            reasoning: "definite threat".into(),
            suggested_action: Action::Block,
        };
        assert_eq!(apply_oracle_override(Action::Confirm, &response), Action::Block);
    }

    #[test]
    fn fallback_uncertain_response_keeps_pattern_action() {
        let response = OracleResponse::uncertain("timeout");
        assert!(is_fallback_response(&response));
        assert_eq!(apply_oracle_override(Action::Warn, &response), Action::Warn);
    }

    #[test]
    fn genuine_suggest_confirm_response_is_not_mistaken_for_fallback() {
        let response = OracleResponse {
            determination: Determination::Threat,
            confidence: 0.6,
            reasoning: "plausible but unverified".into(),
            suggested_action: Action::Confirm,
        };
        assert!(!is_fallback_response(&response));
        assert_eq!(apply_oracle_override(Action::Warn, &response), Action::Confirm);
    }
}
