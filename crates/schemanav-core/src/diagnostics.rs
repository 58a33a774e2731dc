//! Editor diagnostics with line/character ranges
//!
//! Positions count UTF-16 code units within a line, as editors speaking
//! the Language Server Protocol expect.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::document::Document;
use schemanav_schemas::{Severity, TextSpan, ValidationInsight};
use serde::{Deserialize, Serialize};

pub const DIAGNOSTIC_SOURCE: &str = "schemanav";

/// Zero-based line and UTF-16 character offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Byte offset to position conversion for one text
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    /// Position of a byte offset, clamped to the text
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset].encode_utf16().count();

        Position::new(line as u32, character as u32)
    }

    pub fn range(&self, span: TextSpan) -> Range {
        Range {
            start: self.position(span.offset),
            end: self.position(span.end()),
        }
    }
}

/// A validation finding placed in the document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    /// Failing keyword
    pub code: String,
    pub source: String,
}

impl Diagnostic {
    /// Place `insight` on the node at its path, the nearest existing
    /// ancestor, or the document start.
    pub fn from_insight(insight: &ValidationInsight, document: &Document, index: &LineIndex<'_>) -> Self {
        let span = document
            .tree
            .as_ref()
            .map(|tree| tree.nearest_node_at_path(&insight.path).span())
            .unwrap_or(TextSpan::new(0, 0));

        Self {
            range: index.range(span),
            message: insight.message.clone(),
            severity: insight.severity,
            code: insight.keyword.clone(),
            source: DIAGNOSTIC_SOURCE.to_string(),
        }
    }
}

/// Diagnostics for every insight of one document
pub fn to_diagnostics(insights: &[ValidationInsight], document: &Document) -> Vec<Diagnostic> {
    let index = LineIndex::new(&document.text);
    insights
        .iter()
        .map(|insight| Diagnostic::from_insight(insight, document, &index))
        .collect()
}
