//! Schema text parsing for JSON and YAML formats
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{SchemaError, SchemaResult};
use serde_json::Value;

/// Supported schema text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json and anything else)
    Json,
}

impl Format {
    /// Detect format from the extension at the end of a location.
    ///
    /// Query strings and fragments are ignored, so
    /// `https://host/s.yaml?v=2` is YAML. Unknown extensions are JSON.
    pub fn from_location(location: &str) -> Self {
        let path = location
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(location);
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }

    /// Check if this format has a syntax tree with byte offsets
    pub fn has_syntax_tree(&self) -> bool {
        matches!(self, Format::Json)
    }
}

/// Schema text parser
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Create a new schema parser
    pub fn new() -> Self {
        Self
    }

    /// Parse schema text in the given format
    pub fn parse_content(&self, content: &str, format: Format, location: &str) -> SchemaResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, location),
            Format::Json => self.parse_json(content, location),
        }
    }

    /// Parse YAML content
    pub fn parse_yaml(&self, content: &str, location: &str) -> SchemaResult<Value> {
        // Parse as YAML first so YAML-specific errors are reported as such
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| SchemaError::yaml_parse_error(location, e))?;

        serde_json::to_value(yaml_value).map_err(|e| SchemaError::json_parse_error(location, e))
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, location: &str) -> SchemaResult<Value> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        serde_json::from_str(content).map_err(|e| SchemaError::json_parse_error(location, e))
    }
}
