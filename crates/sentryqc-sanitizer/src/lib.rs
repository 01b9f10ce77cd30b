//! Output sanitizer: a recursive value walker that runs the injection
//! scanner and secret filter over every string leaf of an arbitrary JSON
//! value, rebuilding mappings and sequences top-down.
//!
//! Strictly synchronous by contract — never promote [`sanitize`] to an
//! `async fn`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod injection;
pub mod models;
pub mod redaction;
pub mod secrets_filter;
pub mod walker;

pub use config::SanitizerConfig;
pub use models::{InjectionFamily, InjectionMatch, ScanResult};
pub use redaction::{Redaction, SanitizeResult};

/// Sanitize an arbitrary `serde_json::Value`. See [`walker::sanitize_value`].
#[must_use]
pub fn sanitize(value: &serde_json::Value, cfg: &SanitizerConfig) -> SanitizeResult {
    walker::sanitize_value(value, cfg)
}

/// Scan a single string for injection attempts without touching secrets.
/// See [`injection::scan`].
#[must_use]
pub fn scan_for_injection(text: &str, cfg: &SanitizerConfig) -> ScanResult {
    injection::scan(text, cfg)
}
