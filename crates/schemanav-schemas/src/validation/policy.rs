//! Severity classification for validation insights
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a validation insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Keyword-to-severity mapping.
///
/// Keywords listed in `warning_keywords` are reported as warnings, every
/// other keyword as an error. The default treats missing required
/// properties as something still being typed rather than a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeverityPolicy {
    pub warning_keywords: Vec<String>,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            warning_keywords: vec!["required".to_string(), "deprecated".to_string()],
        }
    }
}

impl SeverityPolicy {
    /// Policy that reports every keyword as an error
    pub fn strict() -> Self {
        Self {
            warning_keywords: Vec::new(),
        }
    }

    pub fn classify(&self, keyword: &str) -> Severity {
        if self.warning_keywords.iter().any(|k| k == keyword) {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}
