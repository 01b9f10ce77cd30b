//! Injection-scanner taxonomy: the four pattern families and the match/
//! result shapes they produce.

use serde::{Deserialize, Serialize};

/// Which pattern family an injection-scanner match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectionFamily {
    /// "Ignore previous instructions" style attempts to override the
    /// controlling system prompt.
    InstructionOverride,
    /// Attempts to get the system prompt itself echoed back.
    SystemPromptLeak,
    /// Persona/roleplay jailbreaks (DAN-style) and safety-bypass framing.
    Jailbreak,
    /// A match recovered by decoding an encoded substring (base64, hex
    /// escapes, unicode escapes, percent-encoding) and re-scanning it. Never
    /// produced directly by the raw-text pass.
    EncodedPayload,
}

/// One injection-scanner match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionMatch {
    /// Which family matched.
    pub family: InjectionFamily,
    /// Human-readable description of what the pattern targets.
    pub description: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Byte offsets `(start, end)` into the original string, or `None` when
    /// the match was only found inside decoded content and therefore has no
    /// redactable position in the original text.
    pub position: Option<(usize, usize)>,
}

/// The full result of scanning one string for injection attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Whether any pattern matched.
    pub has_injection: bool,
    /// Every match found, deduplicated by position and sorted by start.
    pub matches: Vec<InjectionMatch>,
    /// The highest confidence among `matches`, or `0.0` if none.
    pub highest_confidence: f64,
    /// Present only when redaction is enabled: the input with every
    /// valid-position match replaced by `[REDACTED]`.
    pub sanitized_output: Option<String>,
}
