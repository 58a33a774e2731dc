//! Validation Insight Builder
//!
//! Turns raw validator errors into [`ValidationInsight`]s: a human message
//! (special-cased for `required` and `enum`), the instance location as both
//! pointer and path, the failing keyword, and a severity chosen by a
//! configurable [`SeverityPolicy`].
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

pub mod insight;
pub mod policy;

pub use insight::{build_insights, ValidationInsight, FALSE_SCHEMA_KEYWORD};
pub use policy::{Severity, SeverityPolicy};
