//! Schema Loader
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::config::FetchConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::source::SchemaSource;
use schemanav_schemas::{Format, SchemaInfo};

/// Turns a [`SchemaSource`] into a parsed [`SchemaInfo`]
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    fetcher: Fetcher,
}

impl SchemaLoader {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
        })
    }

    /// Load and parse the schema behind `source`.
    ///
    /// Inline sources are wrapped as-is; URI sources are fetched and parsed
    /// as YAML or JSON depending on the location's extension.
    #[tracing::instrument(skip_all, fields(cache_key = source.cache_key()))]
    pub async fn load(&self, source: &SchemaSource) -> Result<SchemaInfo> {
        match source {
            SchemaSource::Inline {
                schema,
                raw_text,
                cache_key,
            } => Ok(SchemaInfo::build(
                cache_key.clone(),
                schema.clone(),
                raw_text.clone(),
                Format::Json,
            )),
            SchemaSource::Uri { location, .. } => {
                let text = self.fetcher.fetch(location).await?;
                let info = SchemaInfo::from_text(location.as_str(), text)?;
                tracing::debug!(indexed_pointers = info.pointer_index.len(), "loaded schema");
                Ok(info)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use url::Url;

    #[tokio::test]
    async fn test_inline_source_is_wrapped() {
        let loader = SchemaLoader::new(&FetchConfig::default()).unwrap();
        let source = SchemaSource::inline(json!({"properties": {"a": {"title": "A"}}}), "inline:schemas/0");

        let info = loader.load(&source).await.unwrap();
        assert_eq!(info.location, "inline:schemas/0");
        assert!(info.pointer_index.contains("#/properties/a"));
    }

    #[tokio::test]
    async fn test_yaml_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.yml");
        std::fs::write(&path, "type: string\n").unwrap();

        let loader = SchemaLoader::new(&FetchConfig::default()).unwrap();
        let source = SchemaSource::uri(Url::from_file_path(&path).unwrap());
        let info = loader.load(&source).await.unwrap();
        assert_eq!(info.schema, json!({"type": "string"}));
        assert_eq!(info.raw_text, "type: string\n");
    }

    #[tokio::test]
    async fn test_malformed_json_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "{ broken").unwrap();

        let loader = SchemaLoader::new(&FetchConfig::default()).unwrap();
        let source = SchemaSource::uri(Url::from_file_path(&path).unwrap());
        assert!(matches!(loader.load(&source).await, Err(Error::Schema(_))));
    }
}
