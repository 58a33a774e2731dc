//! De-duplicated, user-visible warnings
//!
//! Every engine failure is reported here once per distinct key, so a
//! document that keeps failing the same way does not repeat itself on
//! every edit.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Destination for user-visible warnings
pub trait WarningSink: Send + Sync + fmt::Debug {
    fn warn(&self, message: &str);
}

/// Sink that emits `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Forwards each distinct warning key to a sink exactly once
#[derive(Debug)]
pub struct DedupWarnings {
    sink: Arc<dyn WarningSink>,
    seen: HashSet<String>,
}

impl DedupWarnings {
    pub fn new(sink: Arc<dyn WarningSink>) -> Self {
        Self {
            sink,
            seen: HashSet::new(),
        }
    }

    /// Emit `message` unless `key` was already reported.
    ///
    /// Returns whether the message was emitted.
    pub fn warn_once(&mut self, key: impl Into<String>, message: impl AsRef<str>) -> bool {
        if self.seen.insert(key.into()) {
            self.sink.warn(message.as_ref());
            true
        } else {
            false
        }
    }

    /// Allow `key` to be reported again
    pub fn forget(&mut self, key: &str) -> bool {
        self.seen.remove(key)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for DedupWarnings {
    fn default() -> Self {
        Self::new(Arc::new(TracingWarningSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl WarningSink for Recorder {
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_warns_once_per_key() {
        let recorder = Arc::new(Recorder::default());
        let mut warnings = DedupWarnings::new(recorder.clone());

        assert!(warnings.warn_once("a", "first"));
        assert!(!warnings.warn_once("a", "first again"));
        assert!(warnings.warn_once("b", "second"));

        assert_eq!(*recorder.0.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_forget_and_clear() {
        let recorder = Arc::new(Recorder::default());
        let mut warnings = DedupWarnings::new(recorder.clone());

        warnings.warn_once("a", "one");
        assert!(warnings.forget("a"));
        assert!(warnings.warn_once("a", "two"));

        warnings.clear();
        assert!(warnings.is_empty());
        assert!(warnings.warn_once("a", "three"));
        assert_eq!(recorder.0.lock().unwrap().len(), 3);
    }
}
