//! Built-in configuration templates, usable from any document's
//! `extends: [...]` list without the host having to ship its own template
//! files. Mirrors the shape of a user-authored template: a YAML fragment
//! merged in before the user's own document.

use crate::merge::TemplateRegistry;

const STRICT: &str = r#"
rules:
  purchase:
    action: block
  destructive:
    action: block
  exfiltration:
    action: block
  sanitization:
    minConfidence: 0.5
"#;

const PERMISSIVE: &str = r#"
rules:
  purchase:
    action: warn
  website:
    action: warn
  destructive:
    action: confirm
  exfiltration:
    action: warn
"#;

/// A [`TemplateRegistry`] pre-populated with the `strict` and `permissive`
/// built-in templates. Hosts that want additional named templates register
/// them with [`TemplateRegistry::register`] after calling this.
#[must_use]
pub fn builtin_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry.register("strict", STRICT).expect("builtin template `strict` is valid YAML");
    registry.register("permissive", PERMISSIVE).expect("builtin template `permissive` is valid YAML");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_parse() {
        let registry = builtin_registry();
        let merged = crate::merge::resolve("extends: [strict]\n", &registry).unwrap();
        assert_eq!(merged["rules"]["purchase"]["action"].as_str(), Some("block"));
    }

    #[test]
    fn builtin_templates_are_valid_raw_config() {
        let registry = builtin_registry();
        for name in ["strict", "permissive"] {
            let merged = crate::merge::resolve(&format!("extends: [{name}]\n"), &registry).unwrap();
            let raw: Result<crate::raw::RawConfig, _> = serde_yaml::from_value(merged);
            assert!(raw.is_ok(), "builtin template {name} failed validation: {raw:?}");
        }
    }
}
