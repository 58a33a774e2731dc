//! JSON Pointer codec
//!
//! Converts between JSON Pointer strings (`"#/a/0/b"`, `"/a/0/b"`) and
//! instance paths (`["a", 0, "b"]`). Escaping (`~0`, `~1`) is applied only
//! while encoding or decoding a single segment.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of an instance path: a property name or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array position
    Index(usize),
    /// Object property name
    Key(String),
}

impl PathSegment {
    /// Classify a raw (already unescaped) segment.
    ///
    /// Only canonical non-negative integers (`"0"`, `"12"`, never `"01"` or
    /// `"+1"`) become indices.
    pub fn from_raw(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(index) if index.to_string() == raw => PathSegment::Index(index),
            _ => PathSegment::Key(raw.to_string()),
        }
    }

    /// The segment as a property name (indices are rendered in decimal)
    pub fn as_key(&self) -> String {
        match self {
            PathSegment::Index(index) => index.to_string(),
            PathSegment::Key(key) => key.clone(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => write!(f, "{}", key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Escape a single segment (`~` -> `~0`, then `/` -> `~1`)
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Unescape a single segment (`~1` -> `/`, then `~0` -> `~`)
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Decode a pointer into a path.
///
/// `"#"` and `""` both denote the root. A leading `#` is optional.
pub fn decode(pointer: &str) -> Vec<PathSegment> {
    let body = pointer.strip_prefix('#').unwrap_or(pointer);
    if body.is_empty() {
        return Vec::new();
    }

    body.strip_prefix('/')
        .unwrap_or(body)
        .split('/')
        .map(|raw| PathSegment::from_raw(&unescape_segment(raw)))
        .collect()
}

/// Encode a path as a fragment pointer (`"#/a/0/b"`, root is `"#"`)
pub fn encode(path: &[PathSegment]) -> String {
    let mut pointer = String::from("#");
    pointer.push_str(&to_instance_pointer(path));
    pointer
}

/// Encode a path as a plain pointer (`"/a/0/b"`, root is `""`)
pub fn to_instance_pointer(path: &[PathSegment]) -> String {
    let mut pointer = String::new();
    for segment in path {
        pointer.push('/');
        pointer.push_str(&escape_segment(&segment.as_key()));
    }
    pointer
}

/// Append segments to a pointer.
///
/// The base is decoded, extended, and re-encoded so escaping is always
/// correct. The result keeps the base's form (fragment or plain).
pub fn join(base: &str, segments: &[PathSegment]) -> String {
    let mut path = decode(base);
    path.extend(segments.iter().cloned());
    if base.starts_with('#') {
        encode(&path)
    } else {
        to_instance_pointer(&path)
    }
}

/// Check pointer syntax: empty or `#`, or `/`-prefixed segments with only
/// `~0`/`~1` escape sequences.
pub fn validate(pointer: &str) -> SchemaResult<()> {
    let body = pointer.strip_prefix('#').unwrap_or(pointer);
    if body.is_empty() {
        return Ok(());
    }

    if !body.starts_with('/') {
        return Err(SchemaError::invalid_pointer(
            pointer,
            "JSON pointer must start with '/' or be empty",
        ));
    }

    for segment in body.split('/').skip(1) {
        let mut chars = segment.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '~' {
                match chars.peek() {
                    Some('0') | Some('1') => {
                        chars.next();
                    }
                    _ => {
                        return Err(SchemaError::invalid_pointer(
                            pointer,
                            "Invalid escape sequence in JSON pointer",
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}
