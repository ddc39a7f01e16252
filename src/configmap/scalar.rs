//! Scalar values and their YAML presentation.
//!
//! A configmap entry's value is a [`ScalarValue`]: logical content plus the
//! style it is written in. [`format_value`] maps a raw properties value to
//! the style the merge writes, and the escape helpers translate between
//! document text and content for quoted styles.

use regex::Regex;
use std::sync::LazyLock;

/// Presentation style of a configmap scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// Literal block (`|-`), used for values with significant line breaks.
    Literal,
}

/// A scalar value together with the style it is written in.
///
/// Equality includes the style; the merge compares content only, so an
/// entry keeps its existing quoting when the content already agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarValue {
    pub content: String,
    pub style: ScalarStyle,
}

impl ScalarValue {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: ScalarStyle::Plain,
        }
    }

    pub fn single_quoted(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: ScalarStyle::SingleQuoted,
        }
    }

    pub fn double_quoted(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: ScalarStyle::DoubleQuoted,
        }
    }

    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: ScalarStyle::Literal,
        }
    }
}

/// Choose the YAML presentation for a raw properties value.
///
/// Braced and bracketed values become literal blocks so their inner line
/// breaks survive verbatim. Values wrapped in quotes keep the matching
/// quoted style with the outer quote runs stripped. Everything else is
/// double-quoted, except the empty string which stays plain.
pub fn format_value(raw: &str) -> ScalarValue {
    if raw.starts_with('{') && raw.ends_with('}') {
        ScalarValue::literal(raw)
    } else if raw.starts_with('[') && raw.ends_with(']') {
        ScalarValue::literal(raw)
    } else if raw.starts_with('"') && raw.ends_with('"') {
        ScalarValue::double_quoted(raw.trim_matches('"'))
    } else if raw.starts_with('\'') && raw.ends_with('\'') {
        ScalarValue::single_quoted(raw.trim_matches('\''))
    } else if raw.is_empty() {
        ScalarValue::plain("")
    } else {
        ScalarValue::double_quoted(raw)
    }
}

/// Render an entry as document lines at the given indentation.
///
/// `key_text` is the key exactly as it appears in the document, including
/// any quoting. Literal blocks place their content two columns deeper than
/// the key. Lines carry no trailing newline.
pub(crate) fn render_entry(key_text: &str, value: &ScalarValue, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    match value.style {
        ScalarStyle::Literal => {
            let mut lines = vec![format!("{pad}{key_text}: |-")];
            let inner = " ".repeat(indent + 2);
            for content_line in value.content.lines() {
                if content_line.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{inner}{content_line}"));
                }
            }
            lines
        }
        ScalarStyle::DoubleQuoted => {
            vec![format!(
                "{pad}{key_text}: \"{}\"",
                escape_double_quoted(&value.content)
            )]
        }
        ScalarStyle::SingleQuoted => {
            // Single quotes cannot express line breaks or control characters
            // on one line; such content switches to double quotes.
            if value.content.chars().any(needs_escape) {
                vec![format!(
                    "{pad}{key_text}: \"{}\"",
                    escape_double_quoted(&value.content)
                )]
            } else {
                vec![format!(
                    "{pad}{key_text}: '{}'",
                    value.content.replace('\'', "''")
                )]
            }
        }
        ScalarStyle::Plain => {
            if value.content.is_empty() {
                vec![format!("{pad}{key_text}:")]
            } else {
                vec![format!("{pad}{key_text}: {}", value.content)]
            }
        }
    }
}

fn needs_escape(c: char) -> bool {
    let code = c as u32;
    code < 0x20 || (0x7f..=0x9f).contains(&code)
}

pub(crate) fn escape_double_quoted(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if needs_escape(c) => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Decode the inside of a single-line double-quoted scalar.
///
/// Returns `None` for escape sequences we do not recognize; callers treat
/// the entry as opaque in that case.
pub(crate) fn unescape_double_quoted(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            't' | '\t' => out.push('\t'),
            'n' => out.push('\n'),
            'v' => out.push('\u{0B}'),
            'f' => out.push('\u{0C}'),
            'r' => out.push('\r'),
            'e' => out.push('\u{1B}'),
            ' ' => out.push(' '),
            '"' => out.push('"'),
            '/' => out.push('/'),
            '\\' => out.push('\\'),
            'N' => out.push('\u{85}'),
            '_' => out.push('\u{A0}'),
            'L' => out.push('\u{2028}'),
            'P' => out.push('\u{2029}'),
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            _ => return None,
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: u32) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

/// Decode the inside of a single-line single-quoted scalar.
pub(crate) fn unescape_single_quoted(raw: &str) -> String {
    raw.replace("''", "'")
}

/// Plain scalars the YAML 1.1 resolver assigns a non-string type: null,
/// booleans, integers (including base-2/8/16 and sexagesimal), floats,
/// timestamps, and the `=`/`<<` specials.
static NON_STRING_PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = concat!(
        r"^(?:~|null|Null|NULL",
        r"|yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF",
        r"|=|<<",
        r"|[-+]?0b[0-1_]+|[-+]?0[0-7_]+|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x[0-9a-fA-F_]+",
        r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+",
        r"|[-+]?[0-9][0-9_]*\.[0-9_]*(?:[eE][-+][0-9]+)?|\.[0-9_]+(?:[eE][-+][0-9]+)?",
        r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
        r"|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN)",
        r"|[0-9]{4}-[0-9]{2}-[0-9]{2}",
        r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}",
        r"(?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?",
        r")$",
    );
    Regex::new(pattern).expect("Invalid plain scalar regex")
});

/// Whether a plain scalar with this content reloads as a string.
pub(crate) fn plain_is_stringy(content: &str) -> bool {
    !NON_STRING_PLAIN.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braced_values_become_literal_blocks() {
        let value = format_value("{\n  \"a\": 1\n}");
        assert_eq!(value.style, ScalarStyle::Literal);
        assert_eq!(value.content, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn bracketed_values_become_literal_blocks() {
        let value = format_value("[\n  one,\n  two\n]");
        assert_eq!(value.style, ScalarStyle::Literal);
        assert_eq!(value.content, "[\n  one,\n  two\n]");
    }

    #[test]
    fn double_quoted_values_strip_outer_quote_runs() {
        assert_eq!(
            format_value("\"hello\""),
            ScalarValue::double_quoted("hello")
        );
        // All leading and trailing quotes go, not just one layer.
        assert_eq!(
            format_value("\"\"nested\"\""),
            ScalarValue::double_quoted("nested")
        );
        assert_eq!(format_value("\""), ScalarValue::double_quoted(""));
    }

    #[test]
    fn single_quoted_values_strip_outer_quote_runs() {
        assert_eq!(format_value("'world'"), ScalarValue::single_quoted("world"));
        assert_eq!(format_value("'"), ScalarValue::single_quoted(""));
    }

    #[test]
    fn empty_value_stays_plain() {
        assert_eq!(format_value(""), ScalarValue::plain(""));
    }

    #[test]
    fn bare_values_are_double_quoted() {
        assert_eq!(format_value("8080"), ScalarValue::double_quoted("8080"));
        assert_eq!(format_value("a b c"), ScalarValue::double_quoted("a b c"));
        // Mismatched delimiters are not bracketed values.
        assert_eq!(format_value("{x]"), ScalarValue::double_quoted("{x]"));
        assert_eq!(format_value("{"), ScalarValue::double_quoted("{"));
    }

    #[test]
    fn renders_plain_empty_without_trailing_space() {
        let lines = render_entry("key", &ScalarValue::plain(""), 2);
        assert_eq!(lines, vec!["  key:"]);
    }

    #[test]
    fn renders_double_quoted_with_escapes() {
        let value = ScalarValue::double_quoted("say \"hi\"\nback\\slash\ttab");
        let lines = render_entry("msg", &value, 2);
        assert_eq!(lines, vec!["  msg: \"say \\\"hi\\\"\\nback\\\\slash\\ttab\""]);
    }

    #[test]
    fn renders_control_characters_as_hex_escapes() {
        let value = ScalarValue::double_quoted("a\u{01}b");
        let lines = render_entry("k", &value, 0);
        assert_eq!(lines, vec!["k: \"a\\x01b\""]);
    }

    #[test]
    fn renders_single_quoted_doubling_inner_quotes() {
        let value = ScalarValue::single_quoted("it's");
        let lines = render_entry("k", &value, 2);
        assert_eq!(lines, vec!["  k: 'it''s'"]);
    }

    #[test]
    fn single_quoted_with_newline_falls_back_to_double_quotes() {
        let value = ScalarValue::single_quoted("a\nb");
        let lines = render_entry("k", &value, 2);
        assert_eq!(lines, vec!["  k: \"a\\nb\""]);
    }

    #[test]
    fn renders_literal_block_with_inner_indent() {
        let value = ScalarValue::literal("[\n  one,\n  two\n]");
        let lines = render_entry("servers", &value, 2);
        assert_eq!(lines, vec!["  servers: |-", "    [", "      one,", "      two", "    ]"]);
    }

    #[test]
    fn unescapes_double_quoted_sequences() {
        assert_eq!(
            unescape_double_quoted("a\\nb\\t\\\"c\\\"\\\\d"),
            Some("a\nb\t\"c\"\\d".to_string())
        );
        assert_eq!(unescape_double_quoted("\\x41\\u0042"), Some("AB".to_string()));
        assert_eq!(unescape_double_quoted("plain"), Some("plain".to_string()));
    }

    #[test]
    fn rejects_unknown_escape_sequences() {
        assert_eq!(unescape_double_quoted("bad\\q"), None);
        assert_eq!(unescape_double_quoted("trailing\\"), None);
    }

    #[test]
    fn unescapes_single_quoted_doubles() {
        assert_eq!(unescape_single_quoted("it''s"), "it's");
    }

    #[test]
    fn classifies_non_string_plains() {
        for content in [
            "~", "null", "NULL", "true", "False", "yes", "off", "0", "42", "-7", "0x1F", "0b101",
            "017", "1_000", "3.14", "-0.5", ".inf", ".NaN", "1.0e+5", "1:30", "2024-01-15",
            "2024-01-15T10:30:00Z", "=",
        ] {
            assert!(!plain_is_stringy(content), "expected non-string: {content}");
        }
    }

    #[test]
    fn classifies_stringy_plains() {
        for content in ["", "hello", "v1.2.3", "08", "0o17", "1e5", "yes please", "nullish", "x-y"] {
            assert!(plain_is_stringy(content), "expected string: {content}");
        }
    }
}
