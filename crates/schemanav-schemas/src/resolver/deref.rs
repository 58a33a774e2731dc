//! Same-document `$ref` dereferencing
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::pointer::{self, PathSegment};
use serde_json::Value;
use std::collections::HashSet;

/// Follow `$ref` chains starting at `schema` (located at `pointer`).
///
/// Only well-formed fragment pointers (`#`, `#/...`) are followed; external
/// references, plain-name anchors and malformed escapes are opaque leaves. A missing target stops at the
/// referring object. A revisited target stops too, and the `$ref` object is
/// returned as the leaf, which is how reference cycles terminate.
///
/// Returns the final schema and its canonical pointer.
pub fn dereference<'a>(root: &'a Value, schema: &'a Value, pointer: &str) -> (&'a Value, String) {
    let mut current = schema;
    let mut current_pointer = pointer.to_string();
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(reference) = local_reference(current) {
        let target_path = pointer::decode(reference);
        let canonical = pointer::encode(&target_path);

        if !visited.insert(canonical.clone()) {
            log::debug!("Reference cycle through '{}' stopped at '{}'", canonical, current_pointer);
            break;
        }

        match lookup(root, &target_path) {
            Some(target) => {
                current = target;
                current_pointer = canonical;
            }
            None => {
                log::debug!("Unresolvable reference '{}' at '{}'", reference, current_pointer);
                break;
            }
        }
    }

    (current, current_pointer)
}

/// Walk a value by path without any keyword interpretation
pub fn lookup<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(&segment.as_key())?,
            Value::Array(items) => match segment {
                PathSegment::Index(index) => items.get(*index)?,
                PathSegment::Key(_) => return None,
            },
            _ => return None,
        };
    }
    Some(current)
}

fn local_reference(schema: &Value) -> Option<&str> {
    let reference = schema.as_object()?.get("$ref")?.as_str()?;
    if reference != "#" && !reference.starts_with("#/") {
        return None;
    }
    match pointer::validate(reference) {
        Ok(()) => Some(reference),
        Err(e) => {
            log::warn!("Ignoring malformed reference: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_follows_chain() {
        let root = json!({
            "$ref": "#/$defs/a",
            "$defs": {
                "a": { "$ref": "#/$defs/b" },
                "b": { "type": "string" }
            }
        });
        let (schema, pointer) = dereference(&root, &root, "#");
        assert_eq!(schema, &json!({"type": "string"}));
        assert_eq!(pointer, "#/$defs/b");
    }

    #[test]
    fn test_cycle_returns_ref_object() {
        let root = json!({"$ref": "#/a", "a": {"$ref": "#/a"}});
        let (schema, pointer) = dereference(&root, &root, "#");
        assert_eq!(schema, &json!({"$ref": "#/a"}));
        assert_eq!(pointer, "#/a");
    }

    #[test]
    fn test_self_reference_to_root() {
        let root = json!({"$ref": "#"});
        let (schema, pointer) = dereference(&root, &root, "#");
        assert_eq!(schema, &root);
        assert_eq!(pointer, "#");
    }

    #[test]
    fn test_external_and_missing_refs_are_leaves() {
        let root = json!({
            "external": { "$ref": "other.json#/x" },
            "anchor": { "$ref": "#node" },
            "missing": { "$ref": "#/nowhere" }
        });
        for key in ["external", "anchor", "missing"] {
            let start = &root[key];
            let (schema, pointer) = dereference(&root, start, &format!("#/{}", key));
            assert_eq!(schema, start);
            assert_eq!(pointer, format!("#/{}", key));
        }
    }

    #[test]
    fn test_malformed_fragment_is_a_leaf() {
        let root = json!({
            "bad": { "$ref": "#/$defs/a~2b" },
            "$defs": { "a~2b": { "type": "string" }, "a": { "type": "number" } }
        });
        let (schema, pointer) = dereference(&root, &root["bad"], "#/bad");
        assert_eq!(schema, &root["bad"]);
        assert_eq!(pointer, "#/bad");
    }

    #[test]
    fn test_escaped_reference_targets() {
        let root = json!({
            "$ref": "#/$defs/a~1b",
            "$defs": { "a/b": { "const": 1 } }
        });
        let (schema, pointer) = dereference(&root, &root, "#");
        assert_eq!(schema, &json!({"const": 1}));
        assert_eq!(pointer, "#/$defs/a~1b");
    }

    #[test]
    fn test_lookup_through_arrays() {
        let root = json!({"allOf": [{"a": 1}, {"b": 2}]});
        let path = pointer::decode("#/allOf/1/b");
        assert_eq!(lookup(&root, &path), Some(&json!(2)));
        assert_eq!(lookup(&root, &pointer::decode("#/allOf/x")), None);
    }
}
