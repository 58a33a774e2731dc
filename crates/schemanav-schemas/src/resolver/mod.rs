//! Subschema resolution for instance paths
//!
//! Answers "which part of the schema governs the value at this path?" by
//! descending from the schema root one path segment at a time:
//!
//! - property names try `properties`, then `patternProperties` (first match
//!   in the schema's key order), then `additionalProperties` and
//!   `unevaluatedProperties` when they are schemas
//! - array indices try `prefixItems`, then `items` (tuple form by position,
//!   single schema for every index), then `contains`, `additionalItems` and
//!   `unevaluatedItems`
//! - when nothing applies, branches of `allOf`, `anyOf`, `oneOf` (in that
//!   order, then array order) and then `then`/`else` are searched and the
//!   first branch that resolves wins
//!
//! Each matched subschema is dereferenced before the next segment.
//!
//! The composite search is a heuristic. Which `anyOf`/`oneOf` branch really
//! applies can depend on the instance data, which this resolver never looks
//! at, so the first branch that can resolve the segment is reported.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

pub mod deref;
pub mod navigation;

pub use deref::{dereference, lookup};
pub use navigation::NavigationTarget;

use crate::pointer::{self, PathSegment};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

const COMPOSITE_ARRAY_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];
const COMPOSITE_SINGLE_KEYWORDS: [&str; 2] = ["then", "else"];

/// A resolved subschema and its canonical pointer in the schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaResolution {
    pub schema: Value,
    pub pointer: String,
}

impl SchemaResolution {
    /// `title` of the subschema, if it is a string
    pub fn title(&self) -> Option<&str> {
        self.schema.get("title").and_then(Value::as_str)
    }

    /// `description` of the subschema, if it is a string
    pub fn description(&self) -> Option<&str> {
        self.schema.get("description").and_then(Value::as_str)
    }

    /// Property names this subschema requires.
    ///
    /// Includes `required` lists of `allOf` branches, which always apply.
    /// Order follows first appearance.
    pub fn required_properties(&self, root: &Value) -> Vec<String> {
        let mut required = Vec::new();
        collect_required(&self.schema, &mut required);

        if let Some(branches) = self.schema.get("allOf").and_then(Value::as_array) {
            for (index, branch) in branches.iter().enumerate() {
                let branch_pointer = pointer::join(&self.pointer, &["allOf".into(), index.into()]);
                let (branch, _) = dereference(root, branch, &branch_pointer);
                collect_required(branch, &mut required);
            }
        }

        required
    }
}

fn collect_required(schema: &Value, required: &mut Vec<String>) {
    let names = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);

    for name in names {
        if !required.iter().any(|existing| existing == name) {
            required.push(name.to_string());
        }
    }
}

/// Resolve the subschema governing `path` in the schema `root`.
///
/// `None` means no keyword covers the location, which is normal for
/// unconstrained data.
pub fn resolve(root: &Value, path: &[PathSegment]) -> Option<SchemaResolution> {
    let (mut schema, mut schema_pointer) = dereference(root, root, "#");

    for segment in path {
        let (next, next_pointer) = resolve_segment(root, schema, &schema_pointer, segment)?;
        let (next, next_pointer) = dereference(root, next, &next_pointer);
        schema = next;
        schema_pointer = next_pointer;
    }

    Some(SchemaResolution {
        schema: schema.clone(),
        pointer: schema_pointer,
    })
}

type Step<'a> = Option<(&'a Value, String)>;

fn resolve_segment<'a>(
    root: &'a Value,
    schema: &'a Value,
    schema_pointer: &str,
    segment: &PathSegment,
) -> Step<'a> {
    let mut visited = HashSet::from([schema_pointer.to_string()]);

    match segment {
        PathSegment::Key(key) => resolve_property(root, schema, schema_pointer, key, &mut visited),
        PathSegment::Index(index) => {
            resolve_item(root, schema, schema_pointer, *index, &mut visited).or_else(|| {
                // Objects may have numeric-looking property names
                let mut visited = HashSet::from([schema_pointer.to_string()]);
                resolve_property(root, schema, schema_pointer, &index.to_string(), &mut visited)
            })
        }
    }
}

fn resolve_property<'a>(
    root: &'a Value,
    schema: &'a Value,
    schema_pointer: &str,
    key: &str,
    visited: &mut HashSet<String>,
) -> Step<'a> {
    let object = schema.as_object()?;

    if let Some(subschema) = object
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| properties.get(key))
    {
        return Some((subschema, pointer::join(schema_pointer, &["properties".into(), key.into()])));
    }

    if let Some(patterns) = object.get("patternProperties").and_then(Value::as_object) {
        for (pattern, subschema) in patterns {
            if pattern_matches(pattern, key) {
                return Some((
                    subschema,
                    pointer::join(schema_pointer, &["patternProperties".into(), pattern.as_str().into()]),
                ));
            }
        }
    }

    for keyword in ["additionalProperties", "unevaluatedProperties"] {
        if let Some(subschema) = object.get(keyword).filter(|s| is_schema(s)) {
            return Some((subschema, pointer::join(schema_pointer, &[keyword.into()])));
        }
    }

    search_composites(root, object, schema_pointer, visited, |branch, branch_pointer, visited| {
        resolve_property(root, branch, branch_pointer, key, visited)
    })
}

fn resolve_item<'a>(
    root: &'a Value,
    schema: &'a Value,
    schema_pointer: &str,
    index: usize,
    visited: &mut HashSet<String>,
) -> Step<'a> {
    let object = schema.as_object()?;

    if let Some(subschema) = object
        .get("prefixItems")
        .and_then(Value::as_array)
        .and_then(|prefix| prefix.get(index))
    {
        return Some((subschema, pointer::join(schema_pointer, &["prefixItems".into(), index.into()])));
    }

    match object.get("items") {
        Some(Value::Array(tuple)) => {
            if let Some(subschema) = tuple.get(index) {
                return Some((subschema, pointer::join(schema_pointer, &["items".into(), index.into()])));
            }
        }
        Some(subschema) if is_schema(subschema) => {
            return Some((subschema, pointer::join(schema_pointer, &["items".into()])));
        }
        _ => {}
    }

    for keyword in ["contains", "additionalItems", "unevaluatedItems"] {
        if let Some(subschema) = object.get(keyword).filter(|s| is_schema(s)) {
            return Some((subschema, pointer::join(schema_pointer, &[keyword.into()])));
        }
    }

    search_composites(root, object, schema_pointer, visited, |branch, branch_pointer, visited| {
        resolve_item(root, branch, branch_pointer, index, visited)
    })
}

/// Try `step` on each composite branch until one resolves.
///
/// `visited` holds branch pointers already searched for the current segment,
/// so self-referencing composites cannot recurse forever.
fn search_composites<'a, F>(
    root: &'a Value,
    object: &'a Map<String, Value>,
    schema_pointer: &str,
    visited: &mut HashSet<String>,
    mut step: F,
) -> Step<'a>
where
    F: FnMut(&'a Value, &str, &mut HashSet<String>) -> Step<'a>,
{
    let mut branches: Vec<(&'a Value, String)> = Vec::new();

    for keyword in COMPOSITE_ARRAY_KEYWORDS {
        if let Some(items) = object.get(keyword).and_then(Value::as_array) {
            for (index, branch) in items.iter().enumerate() {
                branches.push((branch, pointer::join(schema_pointer, &[keyword.into(), index.into()])));
            }
        }
    }

    for keyword in COMPOSITE_SINGLE_KEYWORDS {
        if let Some(branch) = object.get(keyword) {
            branches.push((branch, pointer::join(schema_pointer, &[keyword.into()])));
        }
    }

    for (branch, branch_pointer) in branches {
        let (branch, branch_pointer) = dereference(root, branch, &branch_pointer);
        if !visited.insert(branch_pointer.clone()) {
            continue;
        }
        if let Some(found) = step(branch, &branch_pointer, visited) {
            return Some(found);
        }
    }

    None
}

/// A subschema usable as a fallback: an object, or the literal `true`
fn is_schema(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Bool(true))
}

fn pattern_matches(pattern: &str, key: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(key),
        Err(e) => {
            log::debug!("Skipping invalid patternProperties key '{}': {}", pattern, e);
            false
        }
    }
}
