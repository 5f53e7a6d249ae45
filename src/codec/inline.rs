//! Inline scalar codec.
//!
//! Environment variables and interactive prompt answers move typed values
//! over a string-only transport. This codec defines that textual contract:
//! [`decode`] turns a single literal token into a typed node and never
//! fails (unrecognized forms fall back to the literal string), [`encode`]
//! renders a node as a token that [`decode`] maps back to the same value.

use crate::tree::ParameterNode;

/// Decodes a literal token into a typed parameter node.
///
/// Rules, in priority order: the case-sensitive literals `true`, `false`
/// and `null`; integer and decimal numerals; single- or double-quoted
/// strings with their quoting undone; anything else as the literal text.
#[must_use]
pub fn decode(text: &str) -> ParameterNode {
    let token = text.trim();

    match token {
        "true" => return ParameterNode::Bool(true),
        "false" => return ParameterNode::Bool(false),
        "null" => return ParameterNode::Null,
        _ => {}
    }

    if let Some(number) = parse_number(token) {
        return number;
    }

    if let Some(inner) = unquote(token) {
        return ParameterNode::Str(inner);
    }

    ParameterNode::Str(token.to_string())
}

/// Encodes a parameter node as a single literal token.
///
/// Strings that would decode as something other than themselves (numerals,
/// reserved literals, text with reserved delimiters or surrounding
/// whitespace, the empty string) are double-quoted; plain strings render
/// unquoted. Lists and maps render in a flow style for prompt display.
#[must_use]
pub fn encode(node: &ParameterNode) -> String {
    match node {
        ParameterNode::Null => String::from("null"),
        ParameterNode::Bool(true) => String::from("true"),
        ParameterNode::Bool(false) => String::from("false"),
        ParameterNode::Int(i) => i.to_string(),
        // Debug keeps the decimal point on whole floats, so the
        // int/float distinction survives a decode of the output.
        ParameterNode::Float(f) => format!("{f:?}"),
        ParameterNode::Str(s) => {
            if needs_quoting(s) {
                quote(s)
            } else {
                s.clone()
            }
        }
        ParameterNode::List(items) => {
            let inner: Vec<String> = items.iter().map(encode).collect();
            format!("[{}]", inner.join(", "))
        }
        ParameterNode::Map(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", encode(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Parses an integer or decimal numeral.
fn parse_number(token: &str) -> Option<ParameterNode> {
    let mut digits = 0usize;
    for c in token.chars() {
        match c {
            '0'..='9' => digits += 1,
            '+' | '-' | '.' | 'e' | 'E' => {}
            _ => return None,
        }
    }
    if digits == 0 {
        return None;
    }

    if let Ok(i) = token.parse::<i64>() {
        return Some(ParameterNode::Int(i));
    }
    token.parse::<f64>().ok().map(ParameterNode::Float)
}

/// Strips matching single or double quotes, undoing quote escaping.
///
/// Inside single quotes a doubled quote stands for a literal quote;
/// inside double quotes backslash escapes apply.
fn unquote(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    match (bytes[0], bytes[bytes.len() - 1]) {
        (b'\'', b'\'') => {
            let inner = &token[1..token.len() - 1];
            Some(inner.replace("''", "'"))
        }
        (b'"', b'"') => {
            let inner = &token[1..token.len() - 1];
            let mut out = String::with_capacity(inner.len());
            let mut escaped = false;
            for c in inner.chars() {
                if escaped {
                    out.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else {
                    out.push(c);
                }
            }
            Some(out)
        }
        _ => None,
    }
}

/// Reserved delimiters that force quoting when they appear in a string.
const RESERVED: &[char] = &[':', '#', ',', '[', ']', '{', '}', '"', '\'', '\n'];

/// Whether a string must be quoted to decode back to itself.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if matches!(s, "true" | "false" | "null") {
        return true;
    }
    if parse_number(s).is_some() {
        return true;
    }
    if s.trim() != s {
        return true;
    }
    s.contains(RESERVED) || s.contains('\\')
}

/// Double-quotes a string, escaping backslashes and quotes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
