//! Normalized, document-relative validation results
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::pointer::{self, PathSegment};
use crate::validation::policy::{Severity, SeverityPolicy};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Keyword reported for instances rejected by a `false` subschema
pub const FALSE_SCHEMA_KEYWORD: &str = "false schema";

/// One validation finding for a document.
///
/// `pointer` is the instance pointer (`""` for the document root,
/// `"/a/0"` otherwise) and `path` is the same location decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationInsight {
    /// `pointer::keyword::message`, stable across validation passes
    pub id: String,
    pub message: String,
    pub pointer: String,
    pub path: Vec<PathSegment>,
    pub severity: Severity,
    pub keyword: String,
}

impl ValidationInsight {
    pub fn new(
        pointer: impl Into<String>,
        keyword: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let pointer = pointer.into();
        let keyword = keyword.into();
        let message = message.into();
        let path = pointer::decode(&pointer);

        Self {
            id: format!("{}::{}::{}", pointer, keyword, message),
            message,
            pointer,
            path,
            severity,
            keyword,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert a raw validator error
    pub fn from_error(error: &ValidationError<'_>, policy: &SeverityPolicy) -> Self {
        let path = pointer::decode(&error.instance_path.to_string());
        let keyword = keyword_of(error);
        let message = format_message(error);
        let severity = policy.classify(&keyword);

        Self::new(pointer::to_instance_pointer(&path), keyword, message, severity)
    }
}

/// Run `validator` against `instance` and collect insights.
///
/// Insights with the same id are reported once, in first-seen order.
pub fn build_insights(validator: &Validator, instance: &Value, policy: &SeverityPolicy) -> Vec<ValidationInsight> {
    let mut seen = HashSet::new();
    let insights: Vec<ValidationInsight> = validator
        .iter_errors(instance)
        .map(|error| ValidationInsight::from_error(&error, policy))
        .filter(|insight| seen.insert(insight.id.clone()))
        .collect();

    log::debug!("Validation produced {} insight(s)", insights.len());
    insights
}

/// Keyword that produced `error`.
///
/// A `false` subschema has no keyword of its own; its schema path ends at
/// whatever name or index held it.
fn keyword_of(error: &ValidationError<'_>) -> String {
    match &error.kind {
        ValidationErrorKind::FalseSchema => FALSE_SCHEMA_KEYWORD.to_string(),
        _ => keyword_from_path(&error.schema_path.to_string()),
    }
}

/// Last property-name segment of a schema path (`/properties/a/type` -> `type`)
fn keyword_from_path(schema_path: &str) -> String {
    pointer::decode(schema_path)
        .iter()
        .rev()
        .find_map(|segment| match segment {
            PathSegment::Key(key) => Some(key.clone()),
            PathSegment::Index(_) => None,
        })
        .unwrap_or_default()
}

fn format_message(error: &ValidationError<'_>) -> String {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            format!("Missing required property: {}", name)
        }
        ValidationErrorKind::Enum { options } => {
            let allowed = match options {
                Value::Array(values) => values.iter().map(Value::to_string).collect::<Vec<_>>().join(", "),
                other => other.to_string(),
            };
            format!("Value must be one of: {}", allowed)
        }
        _ => error.to_string(),
    }
}
