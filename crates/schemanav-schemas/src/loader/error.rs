//! Error types for schema parsing, indexing and compilation
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while turning schema text into something usable
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Malformed JSON text found by the syntax tree parser
    #[error("Syntax error at offset {offset}: {message}")]
    SyntaxError { offset: usize, message: String },

    /// JSON parsing errors
    #[error("Failed to parse JSON schema '{location}': {source}")]
    JsonParseError {
        location: String,
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML schema '{location}': {source}")]
    YamlParseError {
        location: String,
        source: serde_yaml::Error,
    },

    /// The schema parsed but could not be compiled into a validator
    #[error("Failed to compile schema '{cache_key}': {reason}")]
    CompileError { cache_key: String, reason: String },

    /// Pointer syntax errors
    #[error("Invalid JSON pointer '{pointer}': {reason}")]
    InvalidPointer { pointer: String, reason: String },
}

impl SchemaError {
    /// Create a syntax error at a byte offset
    pub fn syntax_error(offset: usize, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            offset,
            message: message.into(),
        }
    }

    /// Create a JSON parsing error with location context
    pub fn json_parse_error(location: impl Into<String>, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            location: location.into(),
            source: error,
        }
    }

    /// Create a YAML parsing error with location context
    pub fn yaml_parse_error(location: impl Into<String>, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            location: location.into(),
            source: error,
        }
    }

    /// Create a compile error
    pub fn compile_error(cache_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CompileError {
            cache_key: cache_key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    /// Byte offset of the failure, for errors that have one
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::SyntaxError { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Location of the schema that failed to parse
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::JsonParseError { location, .. } | Self::YamlParseError { location, .. } => Some(location),
            _ => None,
        }
    }
}
