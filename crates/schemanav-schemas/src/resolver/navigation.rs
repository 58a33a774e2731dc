//! Go-to-definition targets inside a schema's own source text
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::resolver::SchemaResolution;
use crate::syntax::TextSpan;
use serde::{Deserialize, Serialize};

/// Where a resolved subschema lives, plus its human-facing labels.
///
/// `offset`/`length` are absent when the schema has no syntax tree (YAML)
/// or the pointer is not present in the pointer index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTarget {
    pub pointer: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NavigationTarget {
    pub fn new(location: &str, resolution: &SchemaResolution, span: Option<TextSpan>) -> Self {
        Self {
            pointer: resolution.pointer.clone(),
            location: location.to_string(),
            offset: span.map(|span| span.offset),
            length: span.map(|span| span.length),
            title: resolution.title().map(str::to_string),
            description: resolution.description().map(str::to_string),
        }
    }

    /// Check if the target can be opened at a precise source range
    pub fn has_range(&self) -> bool {
        self.offset.is_some() && self.length.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SchemaInfo;
    use crate::pointer::PathSegment;
    use serde_json::json;

    #[test]
    fn test_target_from_json_schema() {
        let text = r#"{"properties": {"port": {"type": "integer", "title": "Port", "description": "TCP port"}}}"#;
        let info = SchemaInfo::from_text("file:///schemas/server.json", text).unwrap();
        let resolution = info.resolve(&[PathSegment::from("port")]).unwrap();
        let target = info.navigation_target(&resolution);

        assert_eq!(target.pointer, "#/properties/port");
        assert_eq!(target.location, "file:///schemas/server.json");
        assert_eq!(target.title.as_deref(), Some("Port"));
        assert_eq!(target.description.as_deref(), Some("TCP port"));

        let offset = target.offset.unwrap();
        let length = target.length.unwrap();
        assert!(text[offset..offset + length].starts_with(r#"{"type": "integer""#));
    }

    #[test]
    fn test_yaml_target_has_no_range() {
        let info = SchemaInfo::from_text(
            "file:///schemas/server.yaml",
            "properties:\n  port:\n    title: Port\n",
        )
        .unwrap();
        let resolution = info.resolve(&[PathSegment::from("port")]).unwrap();
        let target = info.navigation_target(&resolution);

        assert_eq!(target.title.as_deref(), Some("Port"));
        assert!(!target.has_range());
    }

    #[test]
    fn test_serialized_shape() {
        let resolution = SchemaResolution {
            schema: json!({"type": "string"}),
            pointer: "#/items".to_string(),
        };
        let target = NavigationTarget::new("inline:1", &resolution, Some(TextSpan::new(10, 4)));
        assert_eq!(
            serde_json::to_value(&target).unwrap(),
            json!({"pointer": "#/items", "location": "inline:1", "offset": 10, "length": 4})
        );
    }
}
