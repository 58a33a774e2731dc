//! Loaded schema state: parsed value, source text, syntax tree and pointer index
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::SchemaResult;
use crate::loader::parser::{Format, SchemaParser};
use crate::pointer::PathSegment;
use crate::resolver::{self, NavigationTarget, SchemaResolution};
use crate::syntax::{self, SyntaxNode, TextSpan};
use serde_json::Value;
use std::collections::HashMap;

/// Map from canonical fragment pointer (`#/properties/a`) to the source span
/// of the schema node at that location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerIndex {
    spans: HashMap<String, TextSpan>,
}

impl PointerIndex {
    /// Index every node reachable by structural descent of the tree
    pub fn from_tree(tree: &SyntaxNode) -> Self {
        Self {
            spans: tree.pointer_spans().into_iter().collect(),
        }
    }

    pub fn get(&self, pointer: &str) -> Option<TextSpan> {
        self.spans.get(pointer).copied()
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.spans.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Everything known about the schema that governs one document.
///
/// Rebuilt whenever the schema's raw text changes; `raw_text` doubles as the
/// fingerprint for validator caching.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    /// Where the schema came from (URI or inline cache key)
    pub location: String,
    /// Parsed schema value
    pub schema: Value,
    /// Source text exactly as loaded
    pub raw_text: String,
    /// Syntax tree, absent for YAML schemas or text the tree parser rejects
    pub syntax_tree: Option<SyntaxNode>,
    pub pointer_index: PointerIndex,
}

impl SchemaInfo {
    /// Assemble from an already parsed value and its source text
    pub fn build(location: impl Into<String>, schema: Value, raw_text: impl Into<String>, format: Format) -> Self {
        let location = location.into();
        let raw_text = raw_text.into();

        let syntax_tree = if format.has_syntax_tree() {
            match syntax::parse_tree(&raw_text) {
                Ok(tree) => Some(tree),
                Err(e) => {
                    log::debug!("No syntax tree for schema '{}': {}", location, e);
                    None
                }
            }
        } else {
            None
        };

        let pointer_index = syntax_tree
            .as_ref()
            .map(PointerIndex::from_tree)
            .unwrap_or_default();

        Self {
            location,
            schema,
            raw_text,
            syntax_tree,
            pointer_index,
        }
    }

    /// Parse schema text, detecting the format from the location
    pub fn from_text(location: impl Into<String>, raw_text: impl Into<String>) -> SchemaResult<Self> {
        let location = location.into();
        let raw_text = raw_text.into();
        let format = Format::from_location(&location);
        let schema = SchemaParser::new().parse_content(&raw_text, format, &location)?;
        Ok(Self::build(location, schema, raw_text, format))
    }

    /// Content identity used for cache invalidation
    pub fn fingerprint(&self) -> &str {
        &self.raw_text
    }

    /// Subschema governing an instance path
    pub fn resolve(&self, path: &[PathSegment]) -> Option<SchemaResolution> {
        resolver::resolve(&self.schema, path)
    }

    /// Source location, title and description for a resolution
    pub fn navigation_target(&self, resolution: &SchemaResolution) -> NavigationTarget {
        NavigationTarget::new(&self.location, resolution, self.pointer_index.get(&resolution.pointer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_index_covers_schema_tree() {
        let text = r##"{
  "properties": {
    "name": { "type": "string" },
    "tags": { "items": [ { "type": "number" } ] }
  }
}"##;
        let info = SchemaInfo::from_text("file:///s.json", text).unwrap();
        assert!(info.syntax_tree.is_some());

        for pointer in [
            "#",
            "#/properties",
            "#/properties/name",
            "#/properties/name/type",
            "#/properties/tags/items/0",
            "#/properties/tags/items/0/type",
        ] {
            assert!(info.pointer_index.contains(pointer), "missing {}", pointer);
        }

        let span = info.pointer_index.get("#/properties/name").unwrap();
        assert_eq!(&text[span.offset..span.end()], r#"{ "type": "string" }"#);
    }

    #[test]
    fn test_yaml_schema_has_empty_index() {
        let info = SchemaInfo::from_text("file:///s.yaml", "type: object\n").unwrap();
        assert_eq!(info.schema, json!({"type": "object"}));
        assert!(info.syntax_tree.is_none());
        assert!(info.pointer_index.is_empty());
    }

    #[test]
    fn test_fingerprint_is_raw_text() {
        let text = "{ \"type\": \"string\" }";
        let info = SchemaInfo::from_text("inline:0", text).unwrap();
        assert_eq!(info.fingerprint(), text);
    }
}
