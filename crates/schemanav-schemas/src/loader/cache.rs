//! Compiled validator cache keyed by schema source
//!
//! An entry is reused only while the schema's raw text (its fingerprint) is
//! byte-for-byte unchanged. Any edit recompiles.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{SchemaError, SchemaResult};
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cache entry holding a compiled validator and the text it was built from
#[derive(Clone)]
pub struct CacheEntry {
    /// Raw schema text at compile time
    pub fingerprint: String,
    /// Shared compiled validator
    pub validator: Arc<Validator>,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(fingerprint: String, validator: Validator) -> Self {
        Self {
            fingerprint,
            validator: Arc::new(validator),
        }
    }

    /// Check if this cache entry still matches the schema text
    pub fn is_valid(&self, fingerprint: &str) -> bool {
        self.fingerprint == fingerprint
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("fingerprint_len", &self.fingerprint.len())
            .finish_non_exhaustive()
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum cache size (number of compiled validators)
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 256 }
    }
}

/// Cache of compiled validators keyed by schema source identity
#[derive(Debug)]
pub struct ValidatorCache {
    entries: HashMap<String, CacheEntry>,
    config: CacheConfig,
    access_order: Vec<String>, // For LRU eviction
}

impl ValidatorCache {
    /// Create a new validator cache with default configuration
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a new validator cache with custom configuration
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            access_order: Vec::new(),
        }
    }

    /// Return the cached validator for `cache_key` if its fingerprint matches,
    /// otherwise compile `schema` and replace the entry.
    ///
    /// A compile failure evicts any previous entry for the key.
    pub fn get_or_compile(
        &mut self,
        cache_key: &str,
        fingerprint: &str,
        schema: &Value,
    ) -> SchemaResult<Arc<Validator>> {
        if let Some(validator) = self.get(cache_key, fingerprint) {
            log::debug!("Validator cache hit for '{}'", cache_key);
            return Ok(validator);
        }

        match jsonschema::validator_for(schema) {
            Ok(validator) => {
                log::debug!("Compiled validator for '{}'", cache_key);
                let entry = CacheEntry::new(fingerprint.to_string(), validator);
                let shared = Arc::clone(&entry.validator);
                self.put(cache_key, entry);
                Ok(shared)
            }
            Err(e) => {
                log::warn!("Failed to compile schema '{}': {}", cache_key, e);
                self.remove(cache_key);
                Err(SchemaError::compile_error(cache_key, e.to_string()))
            }
        }
    }

    /// Get a cached validator if it exists and matches the fingerprint.
    ///
    /// A stale entry is dropped.
    pub fn get(&mut self, cache_key: &str, fingerprint: &str) -> Option<Arc<Validator>> {
        let valid = self
            .entries
            .get(cache_key)
            .map(|entry| entry.is_valid(fingerprint))?;

        if valid {
            self.update_access_order(cache_key);
            self.entries
                .get(cache_key)
                .map(|entry| Arc::clone(&entry.validator))
        } else {
            self.remove(cache_key);
            None
        }
    }

    fn put(&mut self, cache_key: &str, entry: CacheEntry) {
        if !self.entries.contains_key(cache_key) && self.entries.len() >= self.config.max_entries {
            self.evict_lru();
        }

        self.entries.insert(cache_key.to_string(), entry);
        self.update_access_order(cache_key);
    }

    /// Remove a specific entry from cache
    pub fn remove(&mut self, cache_key: &str) -> bool {
        let removed = self.entries.remove(cache_key).is_some();
        self.access_order.retain(|key| key != cache_key);
        removed
    }

    /// Clear all cache entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    /// Check if cache contains a key
    pub fn contains(&self, cache_key: &str) -> bool {
        self.entries.contains_key(cache_key)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            max_entries: self.config.max_entries,
        }
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.access_order.first().cloned() {
            log::debug!("Evicting validator for '{}'", oldest);
            self.remove(&oldest);
        }
    }

    fn update_access_order(&mut self, cache_key: &str) {
        self.access_order.retain(|key| key != cache_key);
        self.access_order.push(cache_key.to_string());
    }
}

impl Default for ValidatorCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unchanged_text_reuses_validator() {
        let mut cache = ValidatorCache::new();
        let schema = json!({"type": "string"});
        let text = r#"{"type": "string"}"#;

        let first = cache.get_or_compile("file:///s.json", text, &schema).unwrap();
        let second = cache.get_or_compile("file:///s.json", text, &schema).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_text_recompiles() {
        let mut cache = ValidatorCache::new();
        let first = cache
            .get_or_compile("k", r#"{"type": "string"}"#, &json!({"type": "string"}))
            .unwrap();

        // Whitespace-only edits still invalidate
        let second = cache
            .get_or_compile("k", r#"{"type":"string"}"#, &json!({"type": "string"}))
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        let third = cache
            .get_or_compile("k", r#"{"type": "number"}"#, &json!({"type": "number"}))
            .unwrap();
        assert!(third.is_valid(&json!(1)));
        assert!(!third.is_valid(&json!("x")));
    }

    #[test]
    fn test_compile_failure_evicts_entry() {
        let mut cache = ValidatorCache::new();
        cache
            .get_or_compile("k", "{}", &json!({}))
            .unwrap();
        assert!(cache.contains("k"));

        let result = cache.get_or_compile("k", r#"{"type": 12}"#, &json!({"type": 12}));
        assert!(matches!(result, Err(SchemaError::CompileError { .. })));
        assert!(!cache.contains("k"));
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = ValidatorCache::with_config(CacheConfig { max_entries: 2 });
        let schema = json!({});

        cache.get_or_compile("a", "{}", &schema).unwrap();
        cache.get_or_compile("b", "{}", &schema).unwrap();

        // Touch "a" so "b" becomes the oldest
        assert!(cache.get("a", "{}").is_some());
        cache.get_or_compile("c", "{}", &schema).unwrap();

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_cache_stats() {
        let cache = ValidatorCache::new();
        let stats = cache.stats();

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.max_entries, 256);
    }
}
