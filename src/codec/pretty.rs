//! Single-pass JSON reformatter.
//!
//! Reflows compact serialized JSON into an indented rendering with one
//! left-to-right scan. The scanner tracks three pieces of state: nesting
//! depth, whether the position is inside a quoted string, and whether the
//! next character is escaped. The input must already be valid JSON; this
//! is a pure text transform, not a validator.

/// Default indentation unit.
const INDENT_UNIT: &str = "  ";

/// Reformats compact JSON with two-space indentation and a trailing
/// newline.
#[must_use]
pub fn format(compact: &str) -> String {
    format_json(compact, INDENT_UNIT, true)
}

/// Reformats compact JSON text with the given indentation unit.
///
/// Outside of strings, input whitespace is dropped, `{`, `[` and `,`
/// schedule a line break and indentation before the next emitted
/// character, `}` and `]` break and dedent before themselves, and `:` is
/// followed by a single space. String contents pass through unchanged.
#[must_use]
pub fn format_json(compact: &str, indent_unit: &str, trailing_newline: bool) -> String {
    let mut out = String::with_capacity(compact.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_indent: Option<usize> = None;

    for c in compact.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_whitespace() {
            continue;
        }

        match c {
            '{' | '[' => {
                flush_pending(&mut out, &mut pending_indent, indent_unit);
                out.push(c);
                depth += 1;
                pending_indent = Some(depth);
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                pending_indent = None;
                break_and_indent(&mut out, depth, indent_unit);
                out.push(c);
            }
            ',' => {
                out.push(',');
                pending_indent = Some(depth);
            }
            ':' => {
                out.push(':');
                out.push(' ');
            }
            '"' => {
                flush_pending(&mut out, &mut pending_indent, indent_unit);
                out.push('"');
                in_string = true;
            }
            other => {
                flush_pending(&mut out, &mut pending_indent, indent_unit);
                out.push(other);
            }
        }
    }

    if trailing_newline {
        out.push('\n');
    }
    out
}

/// Emits a scheduled line break and indentation, if one is pending.
fn flush_pending(out: &mut String, pending: &mut Option<usize>, indent_unit: &str) {
    if let Some(level) = pending.take() {
        break_and_indent(out, level, indent_unit);
    }
}

/// Emits a line break followed by `level` indentation units.
fn break_and_indent(out: &mut String, level: usize, indent_unit: &str) {
    out.push('\n');
    for _ in 0..level {
        out.push_str(indent_unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_object_with_array_and_string_comma() {
        let input = r#"{"a":[1,2],"b":"x,y"}"#;
        let expected = "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": \"x,y\"\n}\n";
        assert_eq!(format(input), expected);
    }

    #[test]
    fn test_format_nested_objects() {
        let input = r#"{"db":{"host":"localhost","port":5432}}"#;
        let expected = "{\n  \"db\": {\n    \"host\": \"localhost\",\n    \"port\": 5432\n  }\n}\n";
        assert_eq!(format(input), expected);
    }

    #[test]
    fn test_format_drops_input_whitespace() {
        let spaced = "{ \"a\" : 1 ,\n \"b\" : 2 }";
        let compact = "{\"a\":1,\"b\":2}";
        assert_eq!(format(spaced), format(compact));
    }

    #[test]
    fn test_format_preserves_escaped_quote_in_string() {
        let input = r#"{"a":"he said \"hi\", twice"}"#;
        let output = format(input);
        assert!(output.contains("he said \\\"hi\\\", twice"));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_format_colon_inside_string_untouched() {
        let input = r#"{"url":"http://host:80"}"#;
        assert_eq!(format(input), "{\n  \"url\": \"http://host:80\"\n}\n");
    }

    #[test]
    fn test_format_without_trailing_newline() {
        let out = format_json("{\"a\":1}", "  ", false);
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn test_format_custom_indent_unit() {
        let out = format_json("{\"a\":1}", "\t", true);
        assert_eq!(out, "{\n\t\"a\": 1\n}\n");
    }

    #[test]
    fn test_format_scalar_document() {
        assert_eq!(format("42"), "42\n");
    }
}
