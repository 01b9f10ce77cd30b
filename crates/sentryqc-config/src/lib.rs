//! Layered YAML configuration for the tool-call policy enforcement core.
//!
//! Three stages, in order:
//! 1. [`merge::resolve`] — parse the user's document, follow its
//!    `extends[]` chain against a [`merge::TemplateRegistry`], deep-merge
//!    templates under the user's own values, and detect cycles.
//! 2. Deserialize the merged [`serde_yaml::Value`] into [`raw::RawConfig`],
//!    which rejects unknown fields.
//! 3. [`build::build`] — validate severities/actions/modes, compile user
//!    regex extensions (dropping invalid ones with a warning, never
//!    failing), and produce the ready-to-use [`model::EngineConfig`].
//!
//! Mirrors the common `Engine::load_from_yaml_path` convention of
//! `Result<_, String>` for configuration load failures — kept for fidelity
//! rather than introduced as a `thiserror` enum, per this crate's one
//! documented exception to the workspace's error-handling norm.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod build;
pub mod merge;
pub mod model;
pub mod raw;
pub mod templates;

pub use merge::TemplateRegistry;
pub use model::{ApprovalConfig, EngineConfig, LlmConfig};
pub use raw::RawConfig;

/// Load and fully validate a configuration document, resolving its
/// `extends[]` chain against `registry` first.
///
/// # Errors
/// Returns a descriptive error string on malformed YAML, an unresolvable or
/// cyclic `extends[]` chain, an unknown field, or any field whose value
/// fails validation (bad severity/action/mode name, empty parameter name,
/// unrecognized log level).
pub fn load(user_yaml: &str, registry: &merge::TemplateRegistry) -> Result<model::EngineConfig, String> {
    let merged = merge::resolve(user_yaml, registry)?;
    let raw: raw::RawConfig =
        serde_yaml::from_value(merged).map_err(|e| format!("configuration validation failed: {e}"))?;
    build::build(raw)
}

/// Load a configuration document with no template dependencies (an empty
/// [`merge::TemplateRegistry`]). Convenience wrapper over [`load`] for the
/// common case of a self-contained document.
///
/// # Errors
/// Same as [`load`].
pub fn load_standalone(user_yaml: &str) -> Result<model::EngineConfig, String> {
    load(user_yaml, &merge::TemplateRegistry::new())
}
