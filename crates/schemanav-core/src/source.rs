//! Schema Source Resolver
//!
//! Decides which schema governs a document. First match wins:
//!
//! 1. the document's own embedded reference (top-level `$schema` by default)
//! 2. an explicit assignment from the [`AssociationStore`]
//! 3. the generic `schemas` glob mappings
//! 4. the product-specific `productSchemas` glob mappings
//!
//! When nothing matches the caller gets `None` and is expected to warn once.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::association::AssociationStore;
use crate::config::{EngineConfig, SchemaMapping};
use crate::document::Document;
use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use url::Url;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Where a document's schema comes from, and the key its compiled
/// validator is cached under
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Uri {
        location: Url,
        cache_key: String,
    },
    Inline {
        schema: Value,
        raw_text: String,
        cache_key: String,
    },
}

impl SchemaSource {
    pub fn uri(location: Url) -> Self {
        let cache_key = location.to_string();
        SchemaSource::Uri { location, cache_key }
    }

    /// Inline body; the pretty-printed text is its fingerprint
    pub fn inline(schema: Value, cache_key: impl Into<String>) -> Self {
        let raw_text = format!("{:#}", schema);
        SchemaSource::Inline {
            schema,
            raw_text,
            cache_key: cache_key.into(),
        }
    }

    pub fn cache_key(&self) -> &str {
        match self {
            SchemaSource::Uri { cache_key, .. } | SchemaSource::Inline { cache_key, .. } => cache_key,
        }
    }

    /// Location reported in navigation targets and warnings
    pub fn location(&self) -> &str {
        match self {
            SchemaSource::Uri { location, .. } => location.as_str(),
            SchemaSource::Inline { cache_key, .. } => cache_key,
        }
    }
}

/// Which configuration surface a glob mapping came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Schemas,
    ProductSchemas,
}

impl Surface {
    fn name(&self) -> &'static str {
        match self {
            Surface::Schemas => "schemas",
            Surface::ProductSchemas => "productSchemas",
        }
    }
}

/// Resolves schema sources for documents against one configuration
#[derive(Debug)]
pub struct SourceResolver<'a> {
    config: &'a EngineConfig,
    associations: &'a dyn AssociationStore,
}

impl<'a> SourceResolver<'a> {
    pub fn new(config: &'a EngineConfig, associations: &'a dyn AssociationStore) -> Self {
        Self { config, associations }
    }

    #[tracing::instrument(skip_all, fields(document = %document.uri))]
    pub fn resolve(&self, document: &Document) -> Option<SchemaSource> {
        if let Some(reference) = self.embedded_reference(document) {
            match self.resolve_reference(reference, document) {
                Ok(location) => return Some(SchemaSource::uri(location)),
                Err(e) => tracing::debug!(error = %e, "ignoring embedded schema reference"),
            }
        }

        if let Some(reference) = self.associations.get(&document.uri) {
            match self.resolve_reference(&reference, document) {
                Ok(location) => return Some(SchemaSource::uri(location)),
                Err(e) => tracing::debug!(error = %e, "ignoring associated schema reference"),
            }
        }

        self.match_mappings(document, &self.config.schemas, Surface::Schemas)
            .or_else(|| self.match_mappings(document, &self.config.product_schemas, Surface::ProductSchemas))
    }

    fn embedded_reference<'d>(&self, document: &'d Document) -> Option<&'d str> {
        document
            .value
            .get(&self.config.embedded_schema_key)
            .and_then(Value::as_str)
            .filter(|reference| !reference.trim().is_empty())
    }

    fn match_mappings(&self, document: &Document, mappings: &[SchemaMapping], surface: Surface) -> Option<SchemaSource> {
        let candidates = self.match_candidates(document);

        for (index, mapping) in mappings.iter().enumerate() {
            if !mapping_matches(mapping, &candidates) {
                continue;
            }

            if let Some(schema) = &mapping.schema {
                let cache_key = format!("inline:{}/{}", surface.name(), index);
                tracing::debug!(%cache_key, "matched inline schema mapping");
                return Some(SchemaSource::inline(schema.clone(), cache_key));
            }

            if let Some(url) = &mapping.url {
                match self.resolve_reference(url, document) {
                    Ok(location) => {
                        tracing::debug!(%location, surface = surface.name(), "matched schema mapping");
                        return Some(SchemaSource::uri(location));
                    }
                    Err(e) => tracing::debug!(error = %e, "skipping unresolvable schema mapping"),
                }
            }
        }

        None
    }

    /// Relative (to the containing workspace folder) and absolute forms of
    /// the document path, `/`-separated
    fn match_candidates(&self, document: &Document) -> Vec<String> {
        let Some(path) = document.path() else {
            return vec![document.uri.path().to_string()];
        };

        let mut candidates = Vec::new();
        if let Some(folder) = self.containing_folder(&path) {
            if let Ok(relative) = path.strip_prefix(folder) {
                candidates.push(slash_path(relative));
            }
        }
        candidates.push(slash_path(&path));
        candidates
    }

    /// Longest workspace folder containing `path`
    fn containing_folder(&self, path: &Path) -> Option<&'a PathBuf> {
        self.config
            .workspace_folders
            .iter()
            .filter(|folder| path.starts_with(folder))
            .max_by_key(|folder| folder.components().count())
    }

    /// Turn a schema reference into a location.
    ///
    /// Absolute local paths are used directly and scheme-prefixed strings
    /// are parsed as URIs. Anything else is relative to the document's
    /// workspace folder, or to its parent directory outside any workspace.
    pub fn resolve_reference(&self, reference: &str, document: &Document) -> Result<Url> {
        let reference = reference.trim();

        if Path::new(reference).is_absolute() {
            return Url::from_file_path(reference)
                .map_err(|_| Error::invalid_reference(reference, "cannot convert path to a file URL"));
        }

        if has_scheme(reference) {
            return Url::parse(reference).map_err(|e| Error::invalid_reference(reference, e.to_string()));
        }

        let base = match document.path() {
            Some(path) => {
                let folder = self
                    .containing_folder(&path)
                    .cloned()
                    .or_else(|| path.parent().map(Path::to_path_buf))
                    .ok_or_else(|| Error::invalid_reference(reference, "document has no parent directory"))?;
                Url::from_directory_path(&folder)
                    .map_err(|_| Error::invalid_reference(reference, "workspace folder is not absolute"))?
            }
            None => document.uri.clone(),
        };

        base.join(reference)
            .map_err(|e| Error::invalid_reference(reference, e.to_string()))
    }
}

fn mapping_matches(mapping: &SchemaMapping, candidates: &[String]) -> bool {
    mapping.file_match.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(pattern) => candidates
            .iter()
            .any(|candidate| pattern.matches_with(candidate, MATCH_OPTIONS)),
        Err(e) => {
            tracing::debug!(%pattern, error = %e, "invalid fileMatch pattern");
            false
        }
    })
}

fn has_scheme(reference: &str) -> bool {
    static SCHEME: OnceLock<Option<Regex>> = OnceLock::new();
    SCHEME
        .get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]+:").ok())
        .as_ref()
        .is_some_and(|scheme| scheme.is_match(reference))
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::InMemoryAssociations;
    use serde_json::json;

    fn doc(uri: &str, value: Value) -> Document {
        Document::new(Url::parse(uri).unwrap(), value.to_string(), value, None)
    }

    fn config() -> EngineConfig {
        EngineConfig::builder()
            .workspace_folder("/work")
            .schema(SchemaMapping::url(&["services/*.json"], "schemas/service.json"))
            .schema(SchemaMapping::inline(&["*.inline.json"], json!({"type": "object"})))
            .product_schema(SchemaMapping::url(&["*.json"], "https://example.com/product.json"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_embedded_reference_wins() {
        let config = config();
        let mut associations = InMemoryAssociations::new();
        let document = doc("file:///work/services/a.json", json!({"$schema": "./custom.json"}));
        associations.set(&document.uri, "assoc.json".to_string());

        let source = SourceResolver::new(&config, &associations).resolve(&document).unwrap();
        assert_eq!(source.location(), "file:///work/custom.json");
        assert_eq!(source.cache_key(), "file:///work/custom.json");
    }

    #[test]
    fn test_association_before_globs() {
        let config = config();
        let mut associations = InMemoryAssociations::new();
        let document = doc("file:///work/services/a.json", json!({}));
        associations.set(&document.uri, "assoc.json".to_string());

        let source = SourceResolver::new(&config, &associations).resolve(&document).unwrap();
        assert_eq!(source.location(), "file:///work/assoc.json");
    }

    #[test]
    fn test_generic_mapping_on_relative_path() {
        let config = config();
        let associations = InMemoryAssociations::new();
        let document = doc("file:///work/services/a.json", json!({}));

        let source = SourceResolver::new(&config, &associations).resolve(&document).unwrap();
        assert_eq!(source.location(), "file:///work/schemas/service.json");
    }

    #[test]
    fn test_inline_mapping() {
        let config = config();
        let associations = InMemoryAssociations::new();
        let document = doc("file:///work/x.inline.json", json!({}));

        match SourceResolver::new(&config, &associations).resolve(&document).unwrap() {
            SchemaSource::Inline { schema, raw_text, cache_key } => {
                assert_eq!(schema, json!({"type": "object"}));
                assert_eq!(serde_json::from_str::<Value>(&raw_text).unwrap(), schema);
                assert_eq!(cache_key, "inline:schemas/1");
            }
            other => panic!("expected inline source, got {:?}", other),
        }
    }

    #[test]
    fn test_product_mapping_is_last() {
        let config = config();
        let associations = InMemoryAssociations::new();
        let document = doc("file:///elsewhere/plain.json", json!({}));

        let source = SourceResolver::new(&config, &associations).resolve(&document).unwrap();
        assert_eq!(source.location(), "https://example.com/product.json");
    }

    #[test]
    fn test_no_match() {
        let config = EngineConfig::default();
        let associations = InMemoryAssociations::new();
        let document = doc("file:///work/a.json", json!({"$schema": 42}));
        assert!(SourceResolver::new(&config, &associations).resolve(&document).is_none());
    }

    #[test]
    fn test_absolute_glob() {
        let config = EngineConfig::builder()
            .schema(SchemaMapping::url(&["/etc/app/*.json"], "/etc/app/schema.json"))
            .build()
            .unwrap();
        let associations = InMemoryAssociations::new();
        let document = doc("file:///etc/app/main.json", json!({}));

        let source = SourceResolver::new(&config, &associations).resolve(&document).unwrap();
        assert_eq!(source.location(), "file:///etc/app/schema.json");
    }

    #[test]
    fn test_reference_forms() {
        let config = config();
        let associations = InMemoryAssociations::new();
        let resolver = SourceResolver::new(&config, &associations);

        let inside = doc("file:///work/deep/nested/a.json", json!({}));
        assert_eq!(
            resolver.resolve_reference("s.json", &inside).unwrap().as_str(),
            "file:///work/s.json"
        );
        assert_eq!(
            resolver.resolve_reference("../shared/s.json", &inside).unwrap().as_str(),
            "file:///shared/s.json"
        );
        assert_eq!(
            resolver.resolve_reference("/abs/s.json", &inside).unwrap().as_str(),
            "file:///abs/s.json"
        );
        assert_eq!(
            resolver.resolve_reference("https://h/s.json", &inside).unwrap().as_str(),
            "https://h/s.json"
        );

        let outside = doc("file:///tmp/scratch/a.json", json!({}));
        assert_eq!(
            resolver.resolve_reference("s.json", &outside).unwrap().as_str(),
            "file:///tmp/scratch/s.json"
        );
    }

    #[test]
    fn test_longest_workspace_folder_wins() {
        let config = EngineConfig::builder()
            .workspace_folder("/work")
            .workspace_folder("/work/sub")
            .build()
            .unwrap();
        let associations = InMemoryAssociations::new();
        let resolver = SourceResolver::new(&config, &associations);

        let document = doc("file:///work/sub/a/b.json", json!({}));
        assert_eq!(
            resolver.resolve_reference("s.json", &document).unwrap().as_str(),
            "file:///work/sub/s.json"
        );
    }
}
