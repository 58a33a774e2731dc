//! Schema text handling and compiled validator caching
//!
//! This module covers everything between raw schema text and a usable
//! validator:
//! - JSON and YAML parsing with format detection from the location
//! - `SchemaInfo`, the parsed schema plus a pointer index into its source
//! - A validator cache keyed by schema source and invalidated by text changes
//!
//! # Example Usage
//!
//! ```rust
//! use schemanav_schemas::loader::{SchemaInfo, ValidatorCache};
//! use serde_json::json;
//!
//! let info = SchemaInfo::from_text("file:///person.json", r#"{"required": ["name"]}"#)?;
//! let mut cache = ValidatorCache::new();
//! let validator = cache.get_or_compile(&info.location, info.fingerprint(), &info.schema)?;
//! assert!(!validator.is_valid(&json!({})));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod info;
pub mod parser;

pub use cache::{CacheConfig, CacheEntry, CacheStats, ValidatorCache};
pub use error::{SchemaError, SchemaResult};
pub use info::{PointerIndex, SchemaInfo};
pub use parser::{Format, SchemaParser};
