//! Explicit per-document schema assignments
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Storage for schema references chosen by the user for one document.
///
/// References are stored as written (relative paths allowed) and are
/// resolved against the document's folder when used.
pub trait AssociationStore: Send + Sync + fmt::Debug {
    fn get(&self, document: &Url) -> Option<String>;

    fn set(&mut self, document: &Url, reference: String);

    fn remove(&mut self, document: &Url) -> Option<String>;
}

/// Associations kept in memory for the lifetime of the engine
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssociations {
    entries: HashMap<Url, String>,
}

impl InMemoryAssociations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssociationStore for InMemoryAssociations {
    fn get(&self, document: &Url) -> Option<String> {
        self.entries.get(document).cloned()
    }

    fn set(&mut self, document: &Url, reference: String) {
        self.entries.insert(document.clone(), reference);
    }

    fn remove(&mut self, document: &Url) -> Option<String> {
        self.entries.remove(document)
    }
}
