//! PHP source-literal file codec.
//!
//! Some projects keep their local parameters as a PHP file returning an
//! array literal. Dumping emits a `return [...];` short-array expression
//! behind the auto-generation banner; parsing reads such a literal back,
//! accepting both `[...]` and `array(...)` syntax.

use super::{AUTO_GENERATION_BANNER, FileCodec};
use crate::error::ParseError;
use crate::tree::{ParameterMap, ParameterNode};

/// Indentation unit for dumped array literals.
const INDENT: &str = "    ";

/// Codec for `.php` parameter files.
#[derive(Debug, Default)]
pub struct PhpCodec;

impl FileCodec for PhpCodec {
    fn name(&self) -> &'static str {
        "PHP"
    }

    fn parse(&self, source: &str) -> Result<ParameterNode, ParseError> {
        Literal::new(source).parse_document()
    }

    fn dump(&self, doc: &ParameterNode) -> Result<String, ParseError> {
        let mut out = String::from("<?php\n\n");
        out.push_str(AUTO_GENERATION_BANNER);
        out.push_str("\nreturn ");
        render(doc, 0, &mut out);
        out.push_str(";\n");
        Ok(out)
    }

    fn supports(&self, extension: &str) -> bool {
        extension == "php"
    }
}

/// Renders a node as a PHP expression at the given nesting level.
fn render(node: &ParameterNode, level: usize, out: &mut String) {
    match node {
        ParameterNode::Null => out.push_str("null"),
        ParameterNode::Bool(true) => out.push_str("true"),
        ParameterNode::Bool(false) => out.push_str("false"),
        ParameterNode::Int(i) => out.push_str(&i.to_string()),
        ParameterNode::Float(f) => out.push_str(&format!("{f:?}")),
        ParameterNode::Str(s) => render_string(s, out),
        ParameterNode::List(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for item in items {
                push_indent(level + 1, out);
                render(item, level + 1, out);
                out.push_str(",\n");
            }
            push_indent(level, out);
            out.push(']');
        }
        ParameterNode::Map(map) => {
            if map.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (key, item) in map {
                push_indent(level + 1, out);
                render_string(key, out);
                out.push_str(" => ");
                render(item, level + 1, out);
                out.push_str(",\n");
            }
            push_indent(level, out);
            out.push(']');
        }
    }
}

/// Renders a single-quoted PHP string.
fn render_string(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

/// Recursive-descent reader for a returned PHP array literal.
struct Literal {
    chars: Vec<char>,
    pos: usize,
}

impl Literal {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse_document(&mut self) -> Result<ParameterNode, ParseError> {
        self.eat_word("<?php");
        self.skip_trivia();
        if !self.eat_word("return") {
            return Err(self.error("expected a \"return\" statement"));
        }
        let value = self.parse_value()?;
        self.skip_trivia();
        if self.peek() == Some(';') {
            self.pos += 1;
        }
        self.skip_trivia();
        if self.pos < self.chars.len() {
            return Err(self.error("unexpected trailing content after the returned literal"));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<ParameterNode, ParseError> {
        self.skip_trivia();
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                self.parse_array(']')
            }
            Some('\'') => self.parse_single_quoted(),
            Some('"') => self.parse_double_quoted(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_ascii_alphabetic() => self.parse_word(),
            _ => Err(self.error("expected a value")),
        }
    }

    /// Parses array entries up to the closing delimiter.
    ///
    /// Keyed entries build a map (unkeyed entries in a keyed array take
    /// sequential numeric keys, as in PHP); fully unkeyed arrays build a
    /// list; an empty array is an empty map by convention.
    fn parse_array(&mut self, close: char) -> Result<ParameterNode, ParseError> {
        let mut keyed: Vec<(Option<String>, ParameterNode)> = Vec::new();

        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.pos += 1;
                break;
            }

            let first = self.parse_value()?;
            self.skip_trivia();

            if self.peek() == Some('=') && self.chars.get(self.pos + 1) == Some(&'>') {
                self.pos += 2;
                let key = key_text(&first).ok_or_else(|| {
                    self.error("array keys must be scalar values")
                })?;
                let value = self.parse_value()?;
                keyed.push((Some(key), value));
            } else {
                keyed.push((None, first));
            }

            self.skip_trivia();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {}
                _ => return Err(self.error("expected \",\" or the array closer")),
            }
        }

        if keyed.iter().all(|(key, _)| key.is_none()) && !keyed.is_empty() {
            return Ok(ParameterNode::List(
                keyed.into_iter().map(|(_, value)| value).collect(),
            ));
        }

        let mut map = ParameterMap::new();
        let mut next_index = 0i64;
        for (key, value) in keyed {
            let key = key.unwrap_or_else(|| {
                let k = next_index.to_string();
                next_index += 1;
                k
            });
            map.insert(key, value);
        }
        Ok(ParameterNode::Map(map))
    }

    fn parse_single_quoted(&mut self) -> Result<ParameterNode, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\'' => return Ok(ParameterNode::Str(out)),
                '\\' => match self.peek() {
                    Some(next @ ('\'' | '\\')) => {
                        out.push(next);
                        self.pos += 1;
                    }
                    _ => out.push('\\'),
                },
                other => out.push(other),
            }
        }
        Err(self.error("unterminated string literal"))
    }

    fn parse_double_quoted(&mut self) -> Result<ParameterNode, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '"' => return Ok(ParameterNode::Str(out)),
                '\\' => {
                    let Some(next) = self.peek() else {
                        return Err(self.error("unterminated escape sequence"));
                    };
                    self.pos += 1;
                    out.push(match next {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                other => out.push(other),
            }
        }
        Err(self.error("unterminated string literal"))
    }

    fn parse_number(&mut self) -> Result<ParameterNode, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        if let Ok(i) = token.parse::<i64>() {
            return Ok(ParameterNode::Int(i));
        }
        token
            .parse::<f64>()
            .map(ParameterNode::Float)
            .map_err(|_| self.error("malformed number literal"))
    }

    fn parse_word(&mut self) -> Result<ParameterNode, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.to_ascii_lowercase().as_str() {
            "true" => Ok(ParameterNode::Bool(true)),
            "false" => Ok(ParameterNode::Bool(false)),
            "null" => Ok(ParameterNode::Null),
            "array" => {
                self.skip_trivia();
                if self.peek() == Some('(') {
                    self.pos += 1;
                    self.parse_array(')')
                } else {
                    Err(self.error("expected \"(\" after \"array\""))
                }
            }
            _ => Err(self.error(format!("unexpected identifier \"{word}\""))),
        }
    }

    /// Skips whitespace and `#`, `//` and `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            match (self.peek(), self.chars.get(self.pos + 1).copied()) {
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    while self.pos < self.chars.len() {
                        if self.peek() == Some('*')
                            && self.chars.get(self.pos + 1) == Some(&'/')
                        {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let end = self.pos + word.len();
        if end > self.chars.len() {
            return false;
        }
        let slice: String = self.chars[self.pos..end].iter().collect();
        if slice == word {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new("PHP", format!("{} at offset {}", message.into(), self.pos))
    }
}

/// Renders a parsed key expression as a map key.
fn key_text(node: &ParameterNode) -> Option<String> {
    match node {
        ParameterNode::Str(s) => Some(s.clone()),
        ParameterNode::Int(i) => Some(i.to_string()),
        ParameterNode::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
