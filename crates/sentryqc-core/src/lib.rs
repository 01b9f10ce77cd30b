//! Shared vocabulary for the tool-call policy enforcement core.
//!
//! This crate has no opinions about detection logic, sanitization, or
//! storage — it only defines the types every other crate in the workspace
//! agrees on: severities, actions, threat categories, detections, the
//! analysis result envelope, call fingerprinting, and the error taxonomy.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fingerprint;
pub mod ids;
pub mod types;

pub use error::EngineError;
pub use types::{
    Action, AnalysisResult, CallContext, Detection, PendingApproval, Severity, ThreatCategory,
};

/// Version of the `sentryqc-core` library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
