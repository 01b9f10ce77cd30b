//! Error taxonomy shared across the workspace.
//!
//! Only configuration errors are fatal to engine construction; every other
//! error kind in spec is handled locally at its own boundary (detector
//! panics, oracle timeouts, hook panics) and never surfaces as an
//! `EngineError` — see `sentryqc-engine`, `sentryqc-oracle`, and
//! `sentryqc-host` for those boundaries.

use thiserror::Error;

/// Errors that can prevent an engine (or its configuration) from being
/// constructed at all.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration failed to load, merge, or validate. Fatal: the engine
    /// cannot be built from it.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A detector or sanitizer regex pattern failed to compile. Non-fatal by
    /// itself — callers that want the "skip the pattern, keep detecting"
    /// behavior from spec should log this and continue rather than
    /// propagate it; it is surfaced as a variant here so configuration
    /// validation can report every bad pattern at once instead of failing
    /// on the first.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern source text.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Wraps a lower-level serialization failure encountered while building
    /// or validating configuration.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
