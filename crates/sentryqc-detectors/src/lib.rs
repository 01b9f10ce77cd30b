//! Pattern detectors for the tool-call policy enforcement core.
//!
//! Five detector families — purchase, website, destructive, secrets,
//! exfiltration — each a pure function of `(toolName, toolInput, optional
//! URL/output)` and its own configuration. None of them touch I/O or
//! mutable process state; `sentryqc-engine` owns dispatch, caching, and
//! oracle escalation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod destructive;
pub mod exfiltration;
pub mod merge;
pub mod purchase;
pub mod secrets;
pub mod website;

pub use config::DetectorConfig;
pub use secrets::provider_patterns;

use sentryqc_core::{CallContext, Detection};

/// Run every enabled detector against `ctx` and return whatever fired, in
/// no particular order — callers (`sentryqc-engine`) sort by `(severity,
/// confidence)` themselves.
#[must_use]
pub fn detect_all(ctx: &CallContext, cfg: &DetectorConfig, daily_spent: f64) -> Vec<Detection> {
    let mut out = Vec::new();
    if let Some(d) = purchase::detect(ctx, &cfg.purchase, daily_spent) {
        out.push(d);
    }
    if let Some(d) = website::detect(ctx, &cfg.website) {
        out.push(d);
    }
    if let Some(d) = destructive::detect(ctx, &cfg.destructive) {
        out.push(d);
    }
    if let Some(d) = secrets::detect(ctx, &cfg.secrets) {
        out.push(d);
    }
    if let Some(d) = exfiltration::detect(ctx, &cfg.exfiltration) {
        out.push(d);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detect_all_returns_every_firing_category() {
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /"}));
        let detections = detect_all(&ctx, &DetectorConfig::default(), 0.0);
        assert!(detections.iter().any(|d| d.category == sentryqc_core::ThreatCategory::Destructive));
    }

    #[test]
    fn benign_call_detects_nothing() {
        let ctx = CallContext::new("read_file", json!({"path": "/tmp/notes.txt"}));
        let detections = detect_all(&ctx, &DetectorConfig::default(), 0.0);
        assert!(detections.is_empty());
    }
}
