//! Schemanav Schemas - JSON Schema navigation and validation primitives
//!
//! This crate holds the synchronous, I/O-free half of the engine:
//! - **Pointer Codec**: JSON Pointer strings to instance paths and back
//! - **Syntax tree**: byte offsets for every node of a JSON text
//! - **SchemaInfo**: parsed schema, raw text and a pointer index into it
//! - **Validator cache**: compiled validators reused while the schema text is unchanged
//! - **Path resolver**: which subschema governs a given instance path
//! - **Insights**: validator errors normalized into document-relative findings
//!
//! ## Quick Start
//!
//! ```rust
//! use schemanav_schemas::{PathSegment, SchemaInfo};
//!
//! let info = SchemaInfo::from_text(
//!     "file:///server.json",
//!     r#"{"properties": {"ports": {"items": {"type": "integer", "title": "Port"}}}}"#,
//! )?;
//!
//! let path = [PathSegment::from("ports"), PathSegment::Index(0)];
//! let resolution = info.resolve(&path).unwrap();
//! assert_eq!(resolution.pointer, "#/properties/ports/items");
//! assert_eq!(resolution.title(), Some("Port"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod pointer;
pub mod resolver;
pub mod syntax;
pub mod validation;

// Re-export commonly used types for convenience
pub use loader::{
    CacheConfig, CacheStats, Format, PointerIndex, SchemaError, SchemaInfo, SchemaParser,
    SchemaResult, ValidatorCache,
};
pub use pointer::PathSegment;
pub use resolver::{resolve, NavigationTarget, SchemaResolution};
pub use syntax::{parse_tree, NodeKind, SyntaxNode, TextSpan};
pub use validation::{build_insights, Severity, SeverityPolicy, ValidationInsight};

/// Compiled validator type produced by the cache
pub use jsonschema::Validator;
