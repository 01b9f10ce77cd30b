//! Template merging for the `extends[]` chain, including cycle detection.
//!
//! Merging operates on untyped [`serde_yaml::Value`] trees rather than the
//! typed [`crate::raw::RawConfig`]: mappings recurse, sequences concatenate
//! and deduplicate, scalars are last-writer-wins. Operating pre-typing lets
//! a template contribute only a fragment of the schema (e.g. just
//! `rules.website.blocklist`) without needing every other field populated.

use serde_yaml::Value;
use std::collections::HashSet;

/// A named library of reusable configuration fragments.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: std::collections::HashMap<String, Value>,
}

impl TemplateRegistry {
    /// An empty registry with no templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template's YAML source under `name`, replacing any
    /// existing template with that name.
    pub fn register(&mut self, name: impl Into<String>, yaml_source: &str) -> Result<(), String> {
        let name = name.into();
        let value: Value = serde_yaml::from_str(yaml_source)
            .map_err(|e| format!("template {name:?} is not valid YAML: {e}"))?;
        self.templates.insert(name, value);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.templates.get(name)
    }
}

/// Resolve `user_yaml` against `registry`'s templates, following the
/// `extends[]` chain breadth-first in listed order and rejecting cycles.
///
/// Returns the fully merged document as a [`Value`], with the user's own
/// values always winning over anything contributed by a template.
pub fn resolve(user_yaml: &str, registry: &TemplateRegistry) -> Result<Value, String> {
    let user_value: Value =
        serde_yaml::from_str(user_yaml).map_err(|e| format!("malformed configuration YAML: {e}"))?;

    let extends = extract_extends(&user_value);
    let mut visited = HashSet::new();
    let mut merged = Value::Mapping(serde_yaml::Mapping::new());
    for name in &extends {
        let template_value = resolve_template(name, registry, &mut visited)?;
        merged = deep_merge(merged, template_value);
    }
    merged = deep_merge(merged, user_value);
    Ok(merged)
}

fn resolve_template(
    name: &str,
    registry: &TemplateRegistry,
    visited: &mut HashSet<String>,
) -> Result<Value, String> {
    if !visited.insert(name.to_string()) {
        return Err(format!("cyclic template extension detected at {name:?}"));
    }
    let own = registry
        .get(name)
        .cloned()
        .ok_or_else(|| format!("unknown configuration template {name:?}"))?;
    let nested_extends = extract_extends(&own);
    let mut merged = Value::Mapping(serde_yaml::Mapping::new());
    for nested_name in &nested_extends {
        let nested = resolve_template(nested_name, registry, visited)?;
        merged = deep_merge(merged, nested);
    }
    merged = deep_merge(merged, own);
    visited.remove(name);
    Ok(merged)
}

fn extract_extends(value: &Value) -> Vec<String> {
    let Value::Mapping(map) = value else {
        return Vec::new();
    };
    let Some(Value::Sequence(seq)) = map.get(Value::String("extends".to_string())) else {
        return Vec::new();
    };
    seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
}

/// Deep-merge `overlay` onto `base`: mappings recurse key-by-key, sequences
/// concatenate with later-duplicate removal, scalars are last-writer-wins
/// (`overlay` always wins for scalars and is treated as authoritative).
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged_val = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged_val);
            }
            Value::Mapping(base_map)
        }
        (Value::Sequence(mut base_seq), Value::Sequence(overlay_seq)) => {
            for item in overlay_seq {
                if !base_seq.contains(&item) {
                    base_seq.push(item);
                }
            }
            Value::Sequence(base_seq)
        }
        (_, overlay) => overlay,
    }
}
