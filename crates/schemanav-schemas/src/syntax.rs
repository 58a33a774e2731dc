//! Concrete syntax tree for JSON text
//!
//! `serde_json` gives us values but forgets where they came from. The tree
//! built here keeps the byte offset and length of every node so that schema
//! pointers and validation errors can be mapped back to source text.
//! Line (`//`) and block (`/* */`) comments and trailing commas are tolerated.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{SchemaError, SchemaResult};
use crate::pointer::{self, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const MAX_DEPTH: usize = 512;

/// Kind of a syntax tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Array,
    /// `"key": value` pair; children are the key string and the value
    Property,
    String,
    Number,
    Boolean,
    Null,
}

/// Byte range in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub offset: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// A node of the concrete syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    /// Decoded contents of string nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SyntaxNode {
    fn leaf(kind: NodeKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            children: Vec::new(),
            text: None,
        }
    }

    pub fn span(&self) -> TextSpan {
        TextSpan::new(self.offset, self.length)
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Key of a property node
    pub fn property_key(&self) -> Option<&str> {
        if self.kind != NodeKind::Property {
            return None;
        }
        self.children.first().and_then(|key| key.text.as_deref())
    }

    /// Value of a property node
    pub fn property_value(&self) -> Option<&SyntaxNode> {
        if self.kind != NodeKind::Property {
            return None;
        }
        self.children.get(1)
    }

    /// Direct child value addressed by one path segment.
    ///
    /// Duplicate object keys resolve to the last occurrence, matching what
    /// `serde_json` keeps in the parsed value.
    pub fn child_at(&self, segment: &PathSegment) -> Option<&SyntaxNode> {
        match self.kind {
            NodeKind::Object => {
                let key = segment.as_key();
                self.children
                    .iter()
                    .rev()
                    .find(|property| property.property_key() == Some(key.as_str()))
                    .and_then(|property| property.property_value())
            }
            NodeKind::Array => match segment {
                PathSegment::Index(index) => self.children.get(*index),
                PathSegment::Key(_) => None,
            },
            _ => None,
        }
    }

    /// Node at an instance path, if every step exists
    pub fn node_at_path(&self, path: &[PathSegment]) -> Option<&SyntaxNode> {
        let mut current = self;
        for segment in path {
            current = current.child_at(segment)?;
        }
        Some(current)
    }

    /// Deepest existing node along an instance path
    pub fn nearest_node_at_path(&self, path: &[PathSegment]) -> &SyntaxNode {
        let mut current = self;
        for segment in path {
            match current.child_at(segment) {
                Some(child) => current = child,
                None => break,
            }
        }
        current
    }

    /// Every value node with its canonical fragment pointer, in document order
    pub fn pointer_spans(&self) -> Vec<(String, TextSpan)> {
        let mut spans = Vec::new();
        let mut path = Vec::new();
        collect_spans(self, &mut path, &mut spans);
        spans
    }

    /// Rebuild the value this node describes.
    ///
    /// `source` must be the text the tree was parsed from. Lets documents
    /// with comments or trailing commas be validated like plain JSON.
    pub fn to_value(&self, source: &str) -> SchemaResult<Value> {
        let value = match self.kind {
            NodeKind::Object => {
                let mut map = Map::new();
                for property in &self.children {
                    if let (Some(key), Some(value)) = (property.property_key(), property.property_value()) {
                        map.insert(key.to_string(), value.to_value(source)?);
                    }
                }
                Value::Object(map)
            }
            NodeKind::Array => Value::Array(
                self.children
                    .iter()
                    .map(|item| item.to_value(source))
                    .collect::<SchemaResult<_>>()?,
            ),
            NodeKind::Property => match self.property_value() {
                Some(value) => value.to_value(source)?,
                None => Value::Null,
            },
            NodeKind::String => Value::String(self.text.clone().unwrap_or_default()),
            NodeKind::Number => {
                let raw = source
                    .get(self.offset..self.end())
                    .ok_or_else(|| SchemaError::syntax_error(self.offset, "Number outside source text"))?;
                number_value(raw, self.offset)?
            }
            NodeKind::Boolean => Value::Bool(source.get(self.offset..self.end()) == Some("true")),
            NodeKind::Null => Value::Null,
        };
        Ok(value)
    }
}

/// Numeric value of a JSON number literal; literals outside the `f64`
/// range are rejected
fn number_value(raw: &str, offset: usize) -> SchemaResult<Value> {
    serde_json::from_str::<serde_json::Number>(raw)
        .map(Value::Number)
        .map_err(|_| SchemaError::syntax_error(offset, format!("Number out of range: {}", raw)))
}

fn collect_spans(
    node: &SyntaxNode,
    path: &mut Vec<PathSegment>,
    spans: &mut Vec<(String, TextSpan)>,
) {
    spans.push((pointer::encode(path), node.span()));
    match node.kind {
        NodeKind::Object => {
            for property in &node.children {
                if let (Some(key), Some(value)) = (property.property_key(), property.property_value())
                {
                    path.push(PathSegment::Key(key.to_string()));
                    collect_spans(value, path, spans);
                    path.pop();
                }
            }
        }
        NodeKind::Array => {
            for (index, item) in node.children.iter().enumerate() {
                path.push(PathSegment::Index(index));
                collect_spans(item, path, spans);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Parse JSON text into a syntax tree
pub fn parse_tree(text: &str) -> SchemaResult<SyntaxNode> {
    let mut parser = TreeParser::new(text);
    parser.skip_trivia()?;
    let root = parser.parse_value(0)?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(SchemaError::syntax_error(
            parser.pos,
            "Unexpected content after the root value",
        ));
    }
    Ok(root)
}

struct TreeParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TreeParser<'a> {
    fn new(text: &'a str) -> Self {
        let pos = if text.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            text,
            bytes: text.as_bytes(),
            pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> SchemaResult<()> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(byte) = self.peek() {
                            if byte == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        let start = self.pos;
                        self.pos += 2;
                        loop {
                            match self.peek() {
                                None => {
                                    return Err(SchemaError::syntax_error(
                                        start,
                                        "Unterminated block comment",
                                    ))
                                }
                                Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                                    self.pos += 2;
                                    break;
                                }
                                Some(_) => self.pos += 1,
                            }
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> SchemaResult<SyntaxNode> {
        if depth > MAX_DEPTH {
            return Err(SchemaError::syntax_error(self.pos, "Nesting too deep"));
        }

        match self.peek() {
            Some(b'{') => self.parse_object(depth),
            Some(b'[') => self.parse_array(depth),
            Some(b'"') => self.parse_string(),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(b't') => self.parse_literal("true", NodeKind::Boolean),
            Some(b'f') => self.parse_literal("false", NodeKind::Boolean),
            Some(b'n') => self.parse_literal("null", NodeKind::Null),
            Some(_) => Err(SchemaError::syntax_error(self.pos, "Expected a value")),
            None => Err(SchemaError::syntax_error(self.pos, "Unexpected end of input")),
        }
    }

    fn parse_object(&mut self, depth: usize) -> SchemaResult<SyntaxNode> {
        let start = self.pos;
        self.pos += 1;
        let mut properties = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'"') => {}
                _ => {
                    return Err(SchemaError::syntax_error(
                        self.pos,
                        "Expected a property name or '}'",
                    ))
                }
            }

            let key = self.parse_string()?;
            self.skip_trivia()?;
            if self.peek() != Some(b':') {
                return Err(SchemaError::syntax_error(self.pos, "Expected ':'"));
            }
            self.pos += 1;
            self.skip_trivia()?;
            let value = self.parse_value(depth + 1)?;

            let mut property = SyntaxNode::leaf(NodeKind::Property, key.offset, value.end() - key.offset);
            property.children = vec![key, value];
            properties.push(property);

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(SchemaError::syntax_error(self.pos, "Expected ',' or '}'")),
            }
        }

        let mut node = SyntaxNode::leaf(NodeKind::Object, start, self.pos - start);
        node.children = properties;
        Ok(node)
    }

    fn parse_array(&mut self, depth: usize) -> SchemaResult<SyntaxNode> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                break;
            }

            items.push(self.parse_value(depth + 1)?);

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(SchemaError::syntax_error(self.pos, "Expected ',' or ']'")),
            }
        }

        let mut node = SyntaxNode::leaf(NodeKind::Array, start, self.pos - start);
        node.children = items;
        Ok(node)
    }

    fn parse_string(&mut self) -> SchemaResult<SyntaxNode> {
        let start = self.pos;
        self.pos += 1;
        let mut decoded = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(SchemaError::syntax_error(start, "Unterminated string")),
                Some(b'"') => {
                    decoded.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    decoded.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut decoded)?;
                    run_start = self.pos;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(SchemaError::syntax_error(
                        self.pos,
                        "Control character in string",
                    ))
                }
                Some(_) => self.pos += 1,
            }
        }

        let mut node = SyntaxNode::leaf(NodeKind::String, start, self.pos - start);
        node.text = Some(decoded);
        Ok(node)
    }

    fn parse_escape(&mut self, out: &mut String) -> SchemaResult<()> {
        let escape_at = self.pos - 1;
        let Some(byte) = self.peek() else {
            return Err(SchemaError::syntax_error(escape_at, "Unterminated escape"));
        };
        self.pos += 1;

        match byte {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{0008}'),
            b'f' => out.push('\u{000c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let unit = self.parse_hex4()?;
                if (0xD800..0xDC00).contains(&unit)
                    && self.bytes.get(self.pos) == Some(&b'\\')
                    && self.bytes.get(self.pos + 1) == Some(&b'u')
                {
                    let save = self.pos;
                    self.pos += 2;
                    let low = self.parse_hex4()?;
                    if (0xDC00..0xE000).contains(&low) {
                        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                    } else {
                        out.push('\u{fffd}');
                        self.pos = save;
                    }
                } else {
                    out.push(char::from_u32(unit).unwrap_or('\u{fffd}'));
                }
            }
            _ => return Err(SchemaError::syntax_error(escape_at, "Invalid escape sequence")),
        }
        Ok(())
    }

    fn parse_hex4(&mut self) -> SchemaResult<u32> {
        let digits = self
            .text
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| SchemaError::syntax_error(self.pos, "Incomplete unicode escape"))?;
        let unit = u32::from_str_radix(digits, 16)
            .map_err(|_| SchemaError::syntax_error(self.pos, "Invalid unicode escape"))?;
        self.pos += 4;
        Ok(unit)
    }

    fn parse_number(&mut self) -> SchemaResult<SyntaxNode> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(SchemaError::syntax_error(start, "Leading zero in number"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(SchemaError::syntax_error(self.pos, "Expected digit")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.expect_digits()?;
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            self.expect_digits()?;
        }
        if let Some(b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E') = self.peek() {
            return Err(SchemaError::syntax_error(self.pos, "Invalid number"));
        }

        let node = SyntaxNode::leaf(NodeKind::Number, start, self.pos - start);
        number_value(&self.text[start..self.pos], start)?;
        Ok(node)
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect_digits(&mut self) -> SchemaResult<()> {
        let at = self.pos;
        self.skip_digits();
        if self.pos == at {
            return Err(SchemaError::syntax_error(at, "Expected digit"));
        }
        Ok(())
    }

    fn parse_literal(&mut self, literal: &str, kind: NodeKind) -> SchemaResult<SyntaxNode> {
        let start = self.pos;
        if !self.text[start..].starts_with(literal) {
            return Err(SchemaError::syntax_error(start, format!("Expected '{}'", literal)));
        }
        self.pos += literal.len();
        Ok(SyntaxNode::leaf(kind, start, literal.len()))
    }
}
