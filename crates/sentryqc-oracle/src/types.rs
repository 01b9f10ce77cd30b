//! Oracle request/response vocabulary.

use sentryqc_core::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The oracle's judgment about whether a call represents a real threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Determination {
    /// The oracle believes this is a genuine threat.
    Threat,
    /// The oracle believes this is safe.
    Safe,
    /// The oracle could not determine either way (including on timeout).
    Uncertain,
}

/// A request to the oracle for a second opinion on an ambiguous call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Name of the tool being invoked.
    pub tool_name: String,
    /// The tool's input.
    pub tool_input: Value,
    /// The pattern-based detections that triggered escalation.
    pub detections: Vec<sentryqc_core::Detection>,
}

/// The oracle's response. Infallible at the trait boundary: every failure
/// mode (transport error, timeout, malformed response) is folded into
/// [`OracleResponse::uncertain`] by the implementation before it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleResponse {
    /// The oracle's determination.
    pub determination: Determination,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Free-text justification.
    pub reasoning: String,
    /// The action the oracle suggests the engine take.
    pub suggested_action: Action,
}

impl OracleResponse {
    /// The canonical fallback response: `{uncertain, 0.5, confirm}`, used on
    /// timeout or any transport/parsing failure so the engine's pattern-based
    /// action is left untouched (see `sentryqc-engine`'s oracle mapping).
    #[must_use]
    pub fn uncertain(reasoning: impl Into<String>) -> Self {
        Self {
            determination: Determination::Uncertain,
            confidence: 0.5,
            reasoning: reasoning.into(),
            suggested_action: Action::Confirm,
        }
    }
}
