//! The schema engine facade
//!
//! `SchemaEngine` owns every cache: the compiled validators (keyed by
//! schema source), the `SchemaInfo` of each open document and the last
//! insight list per document. Validation is a short pipeline:
//! resolve source, load, compile (or reuse), run, convert.
//!
//! Nothing here fails the host. Each failure becomes one de-duplicated
//! warning and the affected document simply has no diagnostics.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::association::{AssociationStore, InMemoryAssociations};
use crate::config::EngineConfig;
use crate::diagnostics::{to_diagnostics, Diagnostic};
use crate::document::Document;
use crate::error::Result;
use crate::loader::SchemaLoader;
use crate::source::{SchemaSource, SourceResolver};
use crate::warnings::{DedupWarnings, TracingWarningSink, WarningSink};
use schemanav_schemas::{
    build_insights, CacheStats, NavigationTarget, PathSegment, SchemaInfo, SchemaResolution,
    ValidationInsight, ValidatorCache,
};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Validation and schema navigation for a set of open documents
#[derive(Debug)]
pub struct SchemaEngine {
    config: EngineConfig,
    associations: Box<dyn AssociationStore>,
    loader: SchemaLoader,
    validators: ValidatorCache,
    schema_infos: HashMap<Url, Arc<SchemaInfo>>,
    insights: HashMap<Url, Vec<ValidationInsight>>,
    warnings: DedupWarnings,
}

impl SchemaEngine {
    /// Engine with in-memory associations and `tracing` warnings
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_parts(
            config,
            Box::new(InMemoryAssociations::new()),
            Arc::new(TracingWarningSink),
        )
    }

    pub fn with_parts(
        config: EngineConfig,
        associations: Box<dyn AssociationStore>,
        sink: Arc<dyn WarningSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader: SchemaLoader::new(&config.fetch)?,
            validators: ValidatorCache::with_config(config.validator_cache.clone()),
            config,
            associations,
            schema_infos: HashMap::new(),
            insights: HashMap::new(),
            warnings: DedupWarnings::new(sink),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration; all caches are dropped
    pub fn update_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        self.loader = SchemaLoader::new(&config.fetch)?;
        self.validators = ValidatorCache::with_config(config.validator_cache.clone());
        self.config = config;
        self.reset();
        Ok(())
    }

    pub fn associations(&self) -> &dyn AssociationStore {
        self.associations.as_ref()
    }

    pub fn associations_mut(&mut self) -> &mut dyn AssociationStore {
        self.associations.as_mut()
    }

    /// Validate a document and return its diagnostics.
    ///
    /// The document's insight list is replaced, never merged. Any failure
    /// along the way leaves the document with no insights.
    #[tracing::instrument(skip_all, fields(document = %document.uri))]
    pub async fn validate(&mut self, document: &Document) -> Vec<Diagnostic> {
        let uri = document.uri.clone();

        if document.tree.is_none() {
            tracing::debug!("document has no syntax tree, skipping");
            self.clear_document_state(&uri);
            return Vec::new();
        }

        let source = SourceResolver::new(&self.config, self.associations.as_ref()).resolve(document);
        let Some(source) = source else {
            self.warnings.warn_once(
                no_schema_key(&uri),
                format!("No JSON schema is associated with {}", uri),
            );
            self.clear_document_state(&uri);
            return Vec::new();
        };

        let info = match self.load(&uri, &source).await {
            Some(info) => info,
            None => {
                self.clear_document_state(&uri);
                return Vec::new();
            }
        };

        let validator = match self
            .validators
            .get_or_compile(source.cache_key(), info.fingerprint(), &info.schema)
        {
            Ok(validator) => validator,
            Err(e) => {
                let message = e.to_string();
                self.warnings.warn_once(
                    format!("compile:{}", message),
                    format!("Schema {} could not be compiled: {}", source.location(), message),
                );
                self.insights.remove(&uri);
                return Vec::new();
            }
        };

        let insights = build_insights(&validator, &document.value, &self.config.severity);
        tracing::debug!(insights = insights.len(), cache_key = source.cache_key(), "validated");

        let diagnostics = to_diagnostics(&insights, document);
        self.insights.insert(uri, insights);
        diagnostics
    }

    /// Load the schema for `uri`, reusing the current `SchemaInfo` when the
    /// schema text has not changed
    async fn load(&mut self, uri: &Url, source: &SchemaSource) -> Option<Arc<SchemaInfo>> {
        match self.loader.load(source).await {
            Ok(loaded) => {
                self.warnings.forget(&load_failure_key(source));
                let reusable = self.schema_infos.get(uri).filter(|current| {
                    current.location == loaded.location && current.fingerprint() == loaded.fingerprint()
                });
                let info = match reusable {
                    Some(current) => Arc::clone(current),
                    None => Arc::new(loaded),
                };
                self.schema_infos.insert(uri.clone(), Arc::clone(&info));
                Some(info)
            }
            Err(e) => {
                tracing::debug!(error = %e, "schema load failed");
                self.warnings.warn_once(
                    load_failure_key(source),
                    format!("Unable to load schema {}: {}", source.location(), e),
                );
                None
            }
        }
    }

    pub fn schema_info(&self, uri: &Url) -> Option<Arc<SchemaInfo>> {
        self.schema_infos.get(uri).cloned()
    }

    /// Insights from the document's last validation
    pub fn insights(&self, uri: &Url) -> Vec<ValidationInsight> {
        self.insights.get(uri).cloned().unwrap_or_default()
    }

    /// Subschema governing `path` in the document's schema
    pub fn resolve_schema_for_path(&self, uri: &Url, path: &[PathSegment]) -> Option<SchemaResolution> {
        self.schema_infos.get(uri)?.resolve(path)
    }

    /// Go-to-definition target for the subschema governing `path`
    pub fn resolve_navigation_target(&self, uri: &Url, path: &[PathSegment]) -> Option<NavigationTarget> {
        let info = self.schema_infos.get(uri)?;
        let resolution = info.resolve(path)?;
        Some(info.navigation_target(&resolution))
    }

    /// Properties required at `path`, including those from `allOf` branches
    pub fn required_properties(&self, uri: &Url, path: &[PathSegment]) -> Vec<String> {
        self.schema_infos
            .get(uri)
            .and_then(|info| {
                info.resolve(path)
                    .map(|resolution| resolution.required_properties(&info.schema))
            })
            .unwrap_or_default()
    }

    /// Forget everything about a closed document
    pub fn close_document(&mut self, uri: &Url) {
        self.clear_document_state(uri);
        self.warnings.forget(&no_schema_key(uri));
    }

    /// Drop every cache and allow all warnings to be reported again
    pub fn reset(&mut self) {
        self.validators.clear();
        self.schema_infos.clear();
        self.insights.clear();
        self.warnings.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.validators.stats()
    }

    fn clear_document_state(&mut self, uri: &Url) {
        self.schema_infos.remove(uri);
        self.insights.remove(uri);
    }
}

fn no_schema_key(uri: &Url) -> String {
    format!("no-schema:{}", uri)
}

fn load_failure_key(source: &SchemaSource) -> String {
    format!("load:{}", source.cache_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaMapping;
    use schemanav_schemas::Severity;
    use serde_json::json;

    fn engine_with_inline(schema: serde_json::Value) -> SchemaEngine {
        let config = EngineConfig::builder()
            .schema(SchemaMapping::inline(&["*.json"], schema))
            .build()
            .unwrap();
        SchemaEngine::new(config).unwrap()
    }

    fn document(text: &str) -> Document {
        Document::from_json(Url::parse("file:///work/doc.json").unwrap(), text).unwrap()
    }

    #[tokio::test]
    async fn test_inline_validation() {
        let mut engine = engine_with_inline(json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        }));
        let doc = document("{}");

        let diagnostics = engine.validate(&doc).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "Missing required property: name");

        let insights = engine.insights(&doc.uri);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].pointer, "");
        assert_eq!(insights[0].keyword, "required");
    }

    #[tokio::test]
    async fn test_insights_are_replaced() {
        let mut engine = engine_with_inline(json!({"properties": {"n": {"type": "number"}}}));

        engine.validate(&document(r#"{"n": "x"}"#)).await;
        assert_eq!(engine.insights(&document("{}").uri).len(), 1);

        let diagnostics = engine.validate(&document(r#"{"n": 1}"#)).await;
        assert!(diagnostics.is_empty());
        assert!(engine.insights(&document("{}").uri).is_empty());
    }

    #[tokio::test]
    async fn test_navigation_after_validation() {
        let mut engine = engine_with_inline(json!({
            "allOf": [
                { "properties": { "x": { "type": "string", "title": "X" } } },
                { "required": ["x", "y"] }
            ]
        }));
        let doc = document(r#"{"x": "ok"}"#);
        engine.validate(&doc).await;

        let x = [PathSegment::from("x")];
        let resolution = engine.resolve_schema_for_path(&doc.uri, &x).unwrap();
        assert_eq!(resolution.pointer, "#/allOf/0/properties/x");
        assert_eq!(engine.resolve_schema_for_path(&doc.uri, &x), Some(resolution));

        let target = engine.resolve_navigation_target(&doc.uri, &x).unwrap();
        assert_eq!(target.location, "inline:schemas/0");
        assert_eq!(target.title.as_deref(), Some("X"));
        assert!(target.offset.is_some());

        assert_eq!(engine.required_properties(&doc.uri, &[]), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_schema_info_is_reused_while_unchanged() {
        let mut engine = engine_with_inline(json!({"type": "object"}));
        let doc = document("{}");

        engine.validate(&doc).await;
        let first = engine.schema_info(&doc.uri).unwrap();
        engine.validate(&doc).await;
        let second = engine.schema_info(&doc.uri).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache_stats().total_entries, 1);
    }

    #[tokio::test]
    async fn test_document_without_tree_is_skipped() {
        let mut engine = engine_with_inline(json!({"type": "string"}));
        let uri = Url::parse("file:///work/doc.json").unwrap();
        let doc = Document::new(uri.clone(), "{}", json!({}), None);

        assert!(engine.validate(&doc).await.is_empty());
        assert!(engine.schema_info(&uri).is_none());
    }

    #[tokio::test]
    async fn test_close_and_reset() {
        let mut engine = engine_with_inline(json!({"type": "string"}));
        let doc = document("{}");

        engine.validate(&doc).await;
        assert!(engine.schema_info(&doc.uri).is_some());
        engine.close_document(&doc.uri);
        assert!(engine.schema_info(&doc.uri).is_none());
        assert!(engine.insights(&doc.uri).is_empty());

        engine.validate(&doc).await;
        engine.reset();
        assert!(engine.schema_info(&doc.uri).is_none());
        assert_eq!(engine.cache_stats().total_entries, 0);
    }

    #[tokio::test]
    async fn test_update_config_resets() {
        let mut engine = engine_with_inline(json!({"type": "string"}));
        let doc = document("{}");
        engine.validate(&doc).await;
        assert_eq!(engine.insights(&doc.uri).len(), 1);

        engine.update_config(EngineConfig::default()).unwrap();
        assert!(engine.insights(&doc.uri).is_empty());
        assert!(engine.validate(&doc).await.is_empty());
        assert!(engine.schema_info(&doc.uri).is_none());
    }
}
