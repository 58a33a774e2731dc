//! Engine configuration
//!
//! Loaded from a JSON or YAML file, or built in code with
//! [`EngineConfig::builder`].
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use schemanav_schemas::{CacheConfig, SeverityPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One glob-to-schema mapping from a configuration surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMapping {
    /// Glob patterns matched against relative and absolute document paths
    #[serde(default)]
    pub file_match: Vec<String>,
    /// External schema reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline schema body; takes precedence over `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl SchemaMapping {
    pub fn url(patterns: &[&str], url: impl Into<String>) -> Self {
        Self {
            file_match: patterns.iter().map(|p| p.to_string()).collect(),
            url: Some(url.into()),
            schema: None,
        }
    }

    pub fn inline(patterns: &[&str], schema: Value) -> Self {
        Self {
            file_match: patterns.iter().map(|p| p.to_string()).collect(),
            url: None,
            schema: Some(schema),
        }
    }
}

/// Remote and local fetch behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Redirect hops followed before giving up
    pub max_redirects: usize,
    /// Request timeout; unset means no timeout
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: 3,
            timeout_secs: None,
            user_agent: format!("schemanav/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Workspace roots for relative references and relative glob matching
    pub workspace_folders: Vec<PathBuf>,
    /// Generic schema mappings
    pub schemas: Vec<SchemaMapping>,
    /// Product-specific schema mappings, consulted after `schemas`
    pub product_schemas: Vec<SchemaMapping>,
    /// Reserved top-level document key naming the document's schema
    pub embedded_schema_key: String,
    pub fetch: FetchConfig,
    pub severity: SeverityPolicy,
    pub validator_cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_folders: Vec::new(),
            schemas: Vec::new(),
            product_schemas: Vec::new(),
            embedded_schema_key: "$schema".to_string(),
            fetch: FetchConfig::default(),
            severity: SeverityPolicy::default(),
            validator_cache: CacheConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load configuration from a JSON or YAML file (by extension)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject mappings that can never produce a schema
    pub fn validate(&self) -> Result<()> {
        for mapping in self.schemas.iter().chain(&self.product_schemas) {
            if mapping.url.is_none() && mapping.schema.is_none() {
                return Err(Error::config(format!(
                    "Schema mapping for {:?} has neither 'url' nor 'schema'",
                    mapping.file_match
                )));
            }
            for pattern in &mapping.file_match {
                if let Err(e) = glob::Pattern::new(pattern) {
                    return Err(Error::Config {
                        message: format!("Invalid fileMatch pattern '{}': {}", pattern, e),
                        source: Some(e.into()),
                    });
                }
            }
        }

        if self.embedded_schema_key.is_empty() {
            return Err(Error::config("embeddedSchemaKey must not be empty"));
        }

        Ok(())
    }
}

/// Builder for [`EngineConfig`]
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn workspace_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.workspace_folders.push(folder.into());
        self
    }

    pub fn schema(mut self, mapping: SchemaMapping) -> Self {
        self.config.schemas.push(mapping);
        self
    }

    pub fn product_schema(mut self, mapping: SchemaMapping) -> Self {
        self.config.product_schemas.push(mapping);
        self
    }

    pub fn embedded_schema_key(mut self, key: impl Into<String>) -> Self {
        self.config.embedded_schema_key = key.into();
        self
    }

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.fetch.max_redirects = max_redirects;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.fetch.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn severity(mut self, policy: SeverityPolicy) -> Self {
        self.config.severity = policy;
        self
    }

    pub fn max_cached_validators(mut self, max_entries: usize) -> Self {
        self.config.validator_cache.max_entries = max_entries;
        self
    }

    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
