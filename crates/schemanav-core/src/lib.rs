//! Schemanav Core - schema association, loading and validation engine
//!
//! This crate connects documents to the JSON Schemas that govern them and
//! keeps the expensive parts cached between edits.
//!
//! # Main Components
//!
//! - **Source resolution**: embedded `$schema`, explicit associations, then
//!   glob mappings from two configuration surfaces
//! - **Loading**: local files and HTTP(S) with a bounded redirect chain
//! - **Engine**: validation into diagnostics, plus on-demand subschema
//!   lookup for completion, hover and go-to-definition
//!
//! # Example
//!
//! ```no_run
//! use schemanav_core::{Document, EngineConfig, SchemaEngine, SchemaMapping};
//! use url::Url;
//!
//! # async fn example() -> schemanav_core::Result<()> {
//! let config = EngineConfig::builder()
//!     .workspace_folder("/work")
//!     .schema(SchemaMapping::url(&["services/*.json"], "schemas/service.json"))
//!     .build()?;
//! let mut engine = SchemaEngine::new(config)?;
//!
//! let uri = Url::parse("file:///work/services/api.json").unwrap();
//! let document = Document::from_json(uri, r#"{"name": "api"}"#)?;
//! for diagnostic in engine.validate(&document).await {
//!     println!("{:?}: {}", diagnostic.range, diagnostic.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

pub mod association;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod source;
pub mod warnings;

// Re-export main types for convenience
pub use association::{AssociationStore, InMemoryAssociations};
pub use config::{EngineConfig, EngineConfigBuilder, FetchConfig, SchemaMapping};
pub use diagnostics::{Diagnostic, LineIndex, Position, Range};
pub use document::Document;
pub use engine::SchemaEngine;
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use loader::SchemaLoader;
pub use source::{SchemaSource, SourceResolver};
pub use warnings::{DedupWarnings, TracingWarningSink, WarningSink};

// Schema-level types that appear in the engine API
pub use schemanav_schemas::{
    NavigationTarget, PathSegment, SchemaInfo, SchemaResolution, Severity, SeverityPolicy,
    ValidationInsight,
};
