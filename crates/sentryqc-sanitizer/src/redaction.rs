//! The sanitizer's public output shape: the filtered value, the
//! deduplicated redaction manifest, and whether anything changed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One aggregated redaction record. Per sanitizer invocation, each distinct
/// `type` appears at most once regardless of how many times it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    /// Short tag, e.g. `"ssn"`, `"openai_api_key"`, `"instruction-override"`.
    pub r#type: String,
    /// Human-readable description of what was redacted and why.
    pub description: String,
}

/// The result of sanitizing one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeResult {
    /// The value after sanitization: mappings and sequences rebuilt
    /// top-down, string leaves replaced as needed, other primitives
    /// untouched.
    pub filtered_value: Value,
    /// Deduplicated-by-type redaction records aggregated across the whole
    /// value.
    pub redactions: Vec<Redaction>,
    /// Whether `filtered_value` differs from the input.
    pub was_redacted: bool,
}
