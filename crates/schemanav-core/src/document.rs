//! Documents handed to the engine
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use schemanav_schemas::{parse_tree, SyntaxNode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

/// A parsed document: identity, text, value and (when available) its
/// syntax tree. Without a tree, diagnostics land at the document start.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub text: String,
    pub value: Value,
    pub tree: Option<SyntaxNode>,
}

impl Document {
    /// Wrap an already parsed value
    pub fn new(uri: Url, text: impl Into<String>, value: Value, tree: Option<SyntaxNode>) -> Self {
        Self {
            uri,
            text: text.into(),
            value,
            tree,
        }
    }

    /// Parse JSON text, tolerating comments and trailing commas
    pub fn from_json(uri: Url, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let tree = parse_tree(&text)?;
        let value = tree.to_value(&text)?;
        Ok(Self::new(uri, text, value, Some(tree)))
    }

    /// Read and parse a JSON document from disk
    pub async fn open(path: &Path) -> Result<Self> {
        let uri = file_url(path)?;
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(uri, text)
    }

    /// Local path of a `file:` document
    pub fn path(&self) -> Option<PathBuf> {
        if self.uri.scheme() == "file" {
            self.uri.to_file_path().ok()
        } else {
            None
        }
    }
}

/// `file:` URL for an absolute local path
pub fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|_| Error::invalid_reference(path.display().to_string(), "not an absolute path"))
}
