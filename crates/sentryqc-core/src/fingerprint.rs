//! Deterministic call fingerprinting.
//!
//! A fingerprint is a 128-bit digest of `(toolName, canonical-JSON(toolInput))`,
//! used as the cache key in `sentryqc-engine`. Per spec: two calls with the
//! same fingerprint must yield the same cached decision until the entry's TTL
//! elapses, and the fingerprint must be computed on the tool input *without*
//! the agent-confirm parameter — presenting a valid ticket is authorization,
//! not identity. Callers are responsible for stripping that parameter before
//! calling [`compute`]; this module has no opinion on parameter names.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// A 128-bit call fingerprint, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Render as a lowercase hex string.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the fingerprint of `(tool_name, tool_input)`.
///
/// `tool_input` must already have any reserved confirmation parameter
/// stripped; see module docs. Serialization uses `serde_json`'s default
/// (BTreeMap-backed, key-sorted) `Value` representation as the canonical
/// form, so structurally identical inputs with differently-ordered object
/// keys hash identically.
#[must_use]
pub fn compute(tool_name: &str, tool_input: &serde_json::Value) -> Fingerprint {
    #[derive(Serialize)]
    struct Keyed<'a> {
        tool: &'a str,
        input: &'a serde_json::Value,
    }
    let bytes = serde_json::to_vec(&Keyed { tool: tool_name, input: tool_input })
        .expect("serde_json::Value serialization is infallible");
    let digest = Sha256::digest(&bytes);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    Fingerprint(out)
}
