//! Sub-detection merging, shared by the `destructive` and `exfiltration`
//! detectors.
//!
//! Built on the same `apply_rules_then_redact`-style most-
//! restrictive-wins reduction, generalized from "pick one rule" to
//! "combine every sub-detector that fired into one `Detection`".

use sentryqc_core::Detection;

/// A single sub-detector's raw finding, before merging.
#[derive(Debug, Clone)]
pub struct SubHit {
    /// Name of the sub-detector that produced this hit (e.g. `"shell"`).
    pub name: &'static str,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable explanation.
    pub reason: String,
}

/// Merge zero or more sub-detector hits into a single `(confidence, reason,
/// sub_detector_names)` triple, applying the shared confidence boost.
///
/// - Zero hits: returns `None`.
/// - One hit: passed through unchanged (no boost — boost only applies once
///   a second independent signal corroborates the first).
/// - Two or more: the highest-confidence hit becomes primary; the rest are
///   appended to the reason as auxiliary corroboration; confidence is
///   boosted by `0.05 * (n - 1)`, capped at `0.99`.
#[must_use]
pub fn merge_subdetections(mut hits: Vec<SubHit>) -> Option<(f64, String, Vec<String>)> {
    if hits.is_empty() {
        return None;
    }
    hits.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

    let n = hits.len();
    let primary = &hits[0];
    let names: Vec<String> = hits.iter().map(|h| h.name.to_string()).collect();

    let reason = if n == 1 {
        primary.reason.clone()
    } else {
        let aux: Vec<&str> = hits[1..].iter().map(|h| h.reason.as_str()).collect();
        format!("{}; also matched: {}", primary.reason, aux.join("; "))
    };

    let boost = if n > 1 { (0.05 * (n as f64 - 1.0)).min(0.99 - primary.confidence).max(0.0) } else { 0.0 };
    let confidence = (primary.confidence + boost).min(0.99);

    Some((confidence, reason, names))
}

/// Attach the merged sub-detector names to a `Detection`'s metadata under
/// `"subDetectors"`.
pub fn annotate_sub_detectors(detection: Detection, names: Vec<String>) -> Detection {
    detection.with_metadata("subDetectors", serde_json::Value::from(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hit_passes_through_unboosted() {
        let hits = vec![SubHit { name: "shell", confidence: 0.8, reason: "rm -rf".into() }];
        let (conf, reason, names) = merge_subdetections(hits).unwrap();
        assert!((conf - 0.8).abs() < 1e-9);
        assert_eq!(reason, "rm -rf");
        assert_eq!(names, vec!["shell".to_string()]);
    }

    #[test]
    fn two_hits_boost_confidence() {
        let hits = vec![
            SubHit { name: "shell", confidence: 0.8, reason: "rm -rf".into() },
            SubHit { name: "cloud", confidence: 0.6, reason: "terraform destroy".into() },
        ];
        let (conf, reason, names) = merge_subdetections(hits).unwrap();
        assert!((conf - 0.85).abs() < 1e-9);
        assert!(reason.contains("rm -rf"));
        assert!(reason.contains("terraform destroy"));
        assert_eq!(names, vec!["shell".to_string(), "cloud".to_string()]);
    }

    #[test]
    fn boost_is_capped_at_point_99() {
        let hits = vec![
            SubHit { name: "a", confidence: 0.95, reason: "a".into() },
            SubHit { name: "b", confidence: 0.9, reason: "b".into() },
            SubHit { name: "c", confidence: 0.9, reason: "c".into() },
        ];
        let (conf, _, _) = merge_subdetections(hits).unwrap();
        assert!(conf <= 0.99);
    }

    #[test]
    fn empty_hits_is_none() {
        assert!(merge_subdetections(Vec::new()).is_none());
    }
}
