//! Destructive-operation detector: shell, cloud, and code sub-detectors
//! merged via the shared [`crate::merge::merge_subdetections`] reduction.

mod cloud;
mod code;
mod shell;

use crate::config::DestructiveConfig;
use crate::merge::{annotate_sub_detectors, merge_subdetections};
use sentryqc_core::{CallContext, Detection, Severity, ThreatCategory};

fn text_of(ctx: &CallContext) -> String {
    let mut s = ctx.tool_input.to_string();
    if let Some(cmd) = ctx.tool_input.get("command").and_then(|v| v.as_str()) {
        s = cmd.to_string();
    } else if let Some(code) = ctx.tool_input.get("code").and_then(|v| v.as_str()) {
        s = code.to_string();
    } else if let Some(script) = ctx.tool_input.get("script").and_then(|v| v.as_str()) {
        s = script.to_string();
    }
    s
}

/// Run the destructive detector against `ctx`.
#[must_use]
pub fn detect(ctx: &CallContext, cfg: &DestructiveConfig) -> Option<Detection> {
    if !cfg.enabled {
        return None;
    }
    let text = text_of(ctx);

    let mut hits = Vec::new();
    hits.extend(shell::detect(&text, &cfg.shell_patterns));
    hits.extend(cloud::detect(&text, &cfg.cloud_patterns));
    hits.extend(code::detect(&text, &cfg.code_patterns));

    let (confidence, reason, names) = merge_subdetections(hits)?;

    let severity = cfg.severity_override.unwrap_or_else(|| severity_for(confidence));

    let detection = Detection::new(ThreatCategory::Destructive, severity, confidence, reason);
    Some(annotate_sub_detectors(detection, names))
}

fn severity_for(confidence: f64) -> Severity {
    if confidence >= 0.95 {
        Severity::Critical
    } else if confidence >= 0.85 {
        Severity::High
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flags_rm_rf_root_as_critical() {
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /"}));
        let d = detect(&ctx, &DestructiveConfig::default()).unwrap();
        assert_eq!(d.category, ThreatCategory::Destructive);
        assert_eq!(d.severity, Severity::Critical);
        assert!(d.confidence >= 0.95);
    }

    #[test]
    fn multiple_sub_detectors_boost_confidence() {
        let ctx = CallContext::new(
            "bash",
            json!({"command": "rm -rf /tmp/data && terraform destroy -auto-approve"}),
        );
        let d = detect(&ctx, &DestructiveConfig::default()).unwrap();
        let names = d.metadata.get("subDetectors").unwrap().as_array().unwrap();
        assert!(names.len() >= 2);
    }

    #[test]
    fn benign_call_no_detection() {
        let ctx = CallContext::new("bash", json!({"command": "ls -la"}));
        assert!(detect(&ctx, &DestructiveConfig::default()).is_none());
    }

    #[test]
    fn disabled_never_fires() {
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /"}));
        let cfg = DestructiveConfig { enabled: false, ..Default::default() };
        assert!(detect(&ctx, &cfg).is_none());
    }
}
