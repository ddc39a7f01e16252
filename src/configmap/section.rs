//! Line-oriented codec for the `configmap:` block of a values document.
//!
//! The document is split into a prefix (everything before the `configmap:`
//! key line), the section body, and a suffix. The body is parsed into items:
//! entries with their full line spans, and passthrough lines (blanks and
//! same-indent comments). Rendering re-emits every untouched line verbatim,
//! so a merge only changes the bytes of the entries it rewrites.
//!
//! Input text must already be newline-normalized; lines never carry `\r`.

use crate::configmap::scalar::{
    self, ScalarStyle, ScalarValue, plain_is_stringy, unescape_double_quoted,
    unescape_single_quoted,
};
use crate::error::{PropmapError, Result};

/// Entry indentation used when the section has no entries to observe.
pub(crate) const DEFAULT_INDENT: usize = 2;

/// A values document split around its configmap section.
#[derive(Debug, Clone)]
pub(crate) struct ParsedDocument {
    /// Lines before the `configmap:` key line. When the key is absent the
    /// whole document lands here and a section is synthesized at the end.
    pub prefix: Vec<String>,
    /// The `configmap:` key line, kept verbatim except that an empty flow
    /// mapping (`configmap: {}`) is rewritten to open a block.
    pub key_line: String,
    /// Section body items in document order.
    pub items: Vec<Item>,
    /// Lines after the section.
    pub suffix: Vec<String>,
    /// Column of the section's entries.
    pub indent: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum Item {
    Entry(Entry),
    /// A blank line or a comment line owned by the section, re-emitted
    /// verbatim and never matched against properties.
    Passthrough(String),
}

/// One configmap entry and the document lines it occupies.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// Logical key, with any quoting decoded.
    pub key: String,
    /// Key as written, including quotes.
    pub key_text: String,
    /// The entry's span: its first line plus any deeper-indented or blank
    /// continuation lines.
    pub lines: Vec<String>,
    pub value: EntryValue,
    /// Trailing comment of the first line, including its leading gap.
    pub eol_comment: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) enum EntryValue {
    /// A scalar that reloads as a string; comparable to formatted values.
    Scalar(ScalarValue),
    /// Anything else: nested structures, flow values, folded blocks,
    /// anchors, tags, and plain scalars that resolve to non-string types.
    /// Opaque entries never match and are rewritten whenever their key is
    /// present in the properties.
    Opaque,
}

impl Entry {
    /// Whether the entry already carries this content. Style differences
    /// alone do not count: an entry keeps its quoting when the content
    /// agrees.
    pub(crate) fn matches(&self, formatted: &ScalarValue) -> bool {
        match &self.value {
            EntryValue::Scalar(value) => value.content == formatted.content,
            EntryValue::Opaque => false,
        }
    }

    /// Replace the entry's lines with a rendering of `value`, keeping the
    /// key text and any trailing comment of the first line.
    pub(crate) fn rewrite(&mut self, value: ScalarValue, indent: usize) {
        self.lines = scalar::render_entry(&self.key_text, &value, indent);
        if let Some(comment) = &self.eol_comment
            && let Some(first) = self.lines.first_mut()
        {
            first.push_str(comment);
        }
        self.value = EntryValue::Scalar(value);
    }
}

impl ParsedDocument {
    /// Render the document back to text. Untouched lines come out
    /// byte-identical; the result always ends with a newline.
    pub(crate) fn render(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        lines.extend(self.prefix.iter().map(String::as_str));
        lines.push(&self.key_line);
        for item in &self.items {
            match item {
                Item::Entry(entry) => lines.extend(entry.lines.iter().map(String::as_str)),
                Item::Passthrough(line) => lines.push(line),
            }
        }
        lines.extend(self.suffix.iter().map(String::as_str));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Keys of all entries in document order.
    pub(crate) fn entry_keys(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Entry(entry) => Some(entry.key.clone()),
                Item::Passthrough(_) => None,
            })
            .collect()
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.items.iter_mut().find_map(|item| match item {
            Item::Entry(entry) if entry.key == key => Some(entry),
            _ => None,
        })
    }

    /// Append a new entry at the end of the section.
    pub(crate) fn push_entry(&mut self, key: &str, value: ScalarValue) {
        let key_text = render_key(key);
        let lines = scalar::render_entry(&key_text, &value, self.indent);
        self.items.push(Item::Entry(Entry {
            key: key.to_string(),
            key_text,
            lines,
            value: EntryValue::Scalar(value),
            eol_comment: None,
        }));
    }

    /// Delete every entry whose key satisfies the predicate, leaving
    /// passthrough lines in place. Returns the number of removed entries.
    pub(crate) fn remove_entries(&mut self, mut doomed: impl FnMut(&str) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| match item {
            Item::Entry(entry) => !doomed(&entry.key),
            Item::Passthrough(_) => true,
        });
        before - self.items.len()
    }
}

/// Parse a values document around its configmap section.
///
/// The caller has already validated the document shape through a real YAML
/// parse; the errors here cover what that validation cannot see, plus the
/// shapes this codec refuses to edit (a non-empty flow mapping).
pub(crate) fn parse_document(content: &str) -> Result<ParsedDocument> {
    let lines: Vec<&str> = content.lines().collect();

    let Some(key_idx) = lines.iter().position(|line| is_configmap_key_line(line)) else {
        // Absent section: initialize an empty one at the end of the document.
        return Ok(ParsedDocument {
            prefix: lines.iter().map(|l| l.to_string()).collect(),
            key_line: "configmap:".to_string(),
            items: Vec::new(),
            suffix: Vec::new(),
            indent: DEFAULT_INDENT,
        });
    };

    let key_line = parse_key_line(lines[key_idx])?;

    // The body runs until the first top-level line that is neither blank nor
    // a comment. Blanks and column-zero comments immediately before that
    // terminator belong to whatever follows, so they are handed to the
    // suffix.
    let mut end = key_idx + 1;
    while end < lines.len() {
        let line = lines[end];
        if !line.trim().is_empty() && !line.starts_with(' ') && !line.trim_start().starts_with('#')
        {
            break;
        }
        end += 1;
    }
    let mut body_end = end;
    while body_end > key_idx + 1 {
        let line = lines[body_end - 1];
        if line.trim().is_empty() || (!line.starts_with(' ') && line.trim_start().starts_with('#'))
        {
            body_end -= 1;
        } else {
            break;
        }
    }

    let (items, indent) = parse_body(&lines[key_idx + 1..body_end])?;

    Ok(ParsedDocument {
        prefix: lines[..key_idx].iter().map(|l| l.to_string()).collect(),
        key_line,
        items,
        suffix: lines[body_end..].iter().map(|l| l.to_string()).collect(),
        indent: indent.unwrap_or(DEFAULT_INDENT),
    })
}

fn is_configmap_key_line(line: &str) -> bool {
    if line.starts_with(' ') || line.starts_with('\t') {
        return false;
    }
    for key in ["configmap", "\"configmap\"", "'configmap'"] {
        if let Some(rest) = line.strip_prefix(key)
            && let Some(after) = rest.strip_prefix(':')
            && (after.is_empty() || after.starts_with(' ') || after.starts_with('\t'))
        {
            return true;
        }
    }
    false
}

/// Validate the configmap key line and normalize an empty flow mapping into
/// a block opener.
fn parse_key_line(line: &str) -> Result<String> {
    let colon = match line.find(':') {
        Some(idx) => idx,
        None => {
            return Err(PropmapError::DocumentError(
                "malformed configmap key line".to_string(),
            ));
        }
    };
    let (head, after) = line.split_at(colon + 1);
    let rest = after.trim_start();

    if rest.is_empty() || rest.starts_with('#') {
        return Ok(line.to_string());
    }
    if let Some(tail) = rest.strip_prefix('{')
        && let Some(close) = tail.find('}')
        && tail[..close].trim().is_empty()
    {
        let remainder = tail[close + 1..].trim_start();
        if remainder.is_empty() {
            return Ok(head.to_string());
        }
        if remainder.starts_with('#') {
            return Ok(format!("{head}  {remainder}"));
        }
    }
    // An explicit null is an empty section, same as a missing value.
    for null in ["~", "null", "Null", "NULL"] {
        if let Some(after) = rest.strip_prefix(null) {
            let remainder = after.trim_start();
            if remainder.is_empty() {
                return Ok(head.to_string());
            }
            if remainder.starts_with('#') {
                return Ok(format!("{head}  {remainder}"));
            }
        }
    }
    Err(PropmapError::DocumentError(
        "configmap must be a block mapping".to_string(),
    ))
}

fn parse_body(body: &[&str]) -> Result<(Vec<Item>, Option<usize>)> {
    let mut items = Vec::new();
    let mut indent: Option<usize> = None;
    let mut i = 0;

    while i < body.len() {
        let line = body[i];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            items.push(Item::Passthrough(line.to_string()));
            i += 1;
            continue;
        }

        let line_indent = leading_spaces(line);
        let entry_indent = *indent.get_or_insert(line_indent);
        if line_indent != entry_indent {
            return Err(PropmapError::DocumentError(
                "inconsistent indentation in the configmap block".to_string(),
            ));
        }

        // The span covers the entry line plus everything blank or indented
        // deeper than the entry.
        let mut span_end = i + 1;
        while span_end < body.len() {
            let next = body[span_end];
            if next.trim().is_empty() || leading_spaces(next) > entry_indent {
                span_end += 1;
            } else {
                break;
            }
        }

        // A deeper-indented tail of only comments and blanks is standalone
        // commentary between entries, not entry content. Block scalars keep
        // their whole span: their content lines can look like comments.
        if span_end > i + 1
            && body[i + 1..span_end].iter().all(|l| {
                let t = l.trim();
                t.is_empty() || t.starts_with('#')
            })
            && let Ok((_, _, rest)) = split_key(&body[i][entry_indent..])
            && !matches!(rest.trim_start().chars().next(), Some('|' | '>'))
        {
            span_end = i + 1;
        }

        let mut entry = parse_entry(&body[i..span_end], entry_indent)?;

        // Trailing blank lines are separators, not entry content; hand them
        // back to the section so deleting the entry keeps them. The entry's
        // value was computed above, while the span was still whole.
        let mut keep = entry.lines.len();
        while keep > 1 && entry.lines[keep - 1].trim().is_empty() {
            keep -= 1;
        }
        let returned = entry.lines.split_off(keep);
        items.push(Item::Entry(entry));
        items.extend(returned.into_iter().map(Item::Passthrough));

        i = span_end;
    }

    Ok((items, indent))
}

fn parse_entry(span: &[&str], indent: usize) -> Result<Entry> {
    let first = span[0];
    let (key, key_text, rest) = split_key(&first[indent..])?;
    let has_continuation = span[1..].iter().any(|l| !l.trim().is_empty());
    let (value, eol_comment) = classify_value(rest, span, indent, has_continuation);

    Ok(Entry {
        key,
        key_text,
        lines: span.iter().map(|l| l.to_string()).collect(),
        value,
        eol_comment,
    })
}

/// Split an entry's first line (already de-indented) into the logical key,
/// the key as written, and the text after the colon.
fn split_key(line: &str) -> Result<(String, String, &str)> {
    if let Some(inner) = line.strip_prefix('"') {
        if let Some(end) = find_double_quote_end(inner) {
            let key_text = &line[..end + 2];
            let rest = line[end + 2..].strip_prefix(':').ok_or_else(|| {
                PropmapError::DocumentError(format!("malformed entry line: '{}'", line.trim_end()))
            })?;
            let key = unescape_double_quoted(&inner[..end]).ok_or_else(|| {
                PropmapError::DocumentError(format!("unsupported escape in key: '{key_text}'"))
            })?;
            return Ok((key, key_text.to_string(), rest));
        }
    } else if let Some(inner) = line.strip_prefix('\'') {
        if let Some(end) = find_single_quote_end(inner) {
            let key_text = &line[..end + 2];
            let rest = line[end + 2..].strip_prefix(':').ok_or_else(|| {
                PropmapError::DocumentError(format!("malformed entry line: '{}'", line.trim_end()))
            })?;
            let key = unescape_single_quoted(&inner[..end]);
            return Ok((key, key_text.to_string(), rest));
        }
    } else {
        let mut chars = line.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            if c == ':' {
                let next = chars.peek().map(|(_, n)| *n);
                if next.is_none() || next == Some(' ') || next == Some('\t') {
                    let key_text = &line[..pos];
                    return Ok((key_text.trim().to_string(), key_text.to_string(), &line[pos + 1..]));
                }
            }
        }
    }
    Err(PropmapError::DocumentError(format!(
        "expected a 'key:' entry in the configmap block, found '{}'",
        line.trim_end()
    )))
}

/// Byte offset of the closing quote in `inner` (the text after an opening
/// `"`), honoring backslash escapes.
fn find_double_quote_end(inner: &str) -> Option<usize> {
    let mut escaped = false;
    for (pos, c) in inner.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(pos);
        }
    }
    None
}

/// Byte offset of the closing quote in `inner` (the text after an opening
/// `'`), where `''` is an escaped quote.
fn find_single_quote_end(inner: &str) -> Option<usize> {
    let bytes = inner.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'\'' {
            if bytes.get(pos + 1) == Some(&b'\'') {
                pos += 2;
                continue;
            }
            return Some(pos);
        }
        pos += 1;
    }
    None
}

/// Decide what an entry's value is from the text after the colon and the
/// rest of its span.
fn classify_value(
    rest: &str,
    span: &[&str],
    indent: usize,
    has_continuation: bool,
) -> (EntryValue, Option<String>) {
    let trimmed = rest.trim_start();

    if trimmed.is_empty() {
        if has_continuation {
            return (EntryValue::Opaque, None);
        }
        // A key with no value reloads as an empty string for our purposes,
        // so an empty property leaves it untouched.
        return (EntryValue::Scalar(ScalarValue::plain("")), None);
    }
    if trimmed.starts_with('#') {
        let comment = Some(rest.to_string());
        if has_continuation {
            return (EntryValue::Opaque, comment);
        }
        return (EntryValue::Scalar(ScalarValue::plain("")), comment);
    }

    match trimmed.chars().next() {
        Some('|') => parse_literal(trimmed, span, indent),
        Some('>') => {
            // Folded blocks fold their line breaks on reload; treat them as
            // opaque rather than modeling the folding rules.
            let comment = block_header_comment(&trimmed[1..]);
            (EntryValue::Opaque, comment)
        }
        Some('"') => classify_double_quoted(trimmed, has_continuation),
        Some('\'') => classify_single_quoted(trimmed, has_continuation),
        Some('{' | '[' | '&' | '*' | '!' | '%' | '@' | '`') => (EntryValue::Opaque, None),
        _ => classify_plain(rest, has_continuation),
    }
}

fn classify_double_quoted(trimmed: &str, has_continuation: bool) -> (EntryValue, Option<String>) {
    let inner = &trimmed[1..];
    let Some(end) = find_double_quote_end(inner) else {
        return (EntryValue::Opaque, None);
    };
    let after = &inner[end + 1..];
    let comment = trailing_comment(after);
    if has_continuation || !after_is_clean(after) {
        return (EntryValue::Opaque, comment);
    }
    match unescape_double_quoted(&inner[..end]) {
        Some(content) => (
            EntryValue::Scalar(ScalarValue::double_quoted(content)),
            comment,
        ),
        None => (EntryValue::Opaque, comment),
    }
}

fn classify_single_quoted(trimmed: &str, has_continuation: bool) -> (EntryValue, Option<String>) {
    let inner = &trimmed[1..];
    let Some(end) = find_single_quote_end(inner) else {
        return (EntryValue::Opaque, None);
    };
    let after = &inner[end + 1..];
    let comment = trailing_comment(after);
    if has_continuation || !after_is_clean(after) {
        return (EntryValue::Opaque, comment);
    }
    (
        EntryValue::Scalar(ScalarValue::single_quoted(unescape_single_quoted(
            &inner[..end],
        ))),
        comment,
    )
}

fn classify_plain(rest: &str, has_continuation: bool) -> (EntryValue, Option<String>) {
    let (value_text, comment) = split_plain_comment(rest);
    if has_continuation {
        return (EntryValue::Opaque, comment);
    }
    let content = value_text.trim();
    if plain_is_stringy(content) {
        (
            EntryValue::Scalar(ScalarValue::plain(content)),
            comment,
        )
    } else {
        (EntryValue::Opaque, comment)
    }
}

/// Whether the text after a closing quote is only whitespace or a comment.
fn after_is_clean(after: &str) -> bool {
    let t = after.trim_start();
    t.is_empty() || t.starts_with('#')
}

/// The trailing comment of a line fragment, with its leading gap.
fn trailing_comment(after: &str) -> Option<String> {
    let t = after.trim_start();
    if t.starts_with('#') {
        Some(after.to_string())
    } else {
        None
    }
}

/// Find a `#` that starts a comment in plain-scalar context: it must be
/// preceded by whitespace. Returns the value text and the comment with its
/// gap.
fn split_plain_comment(rest: &str) -> (&str, Option<String>) {
    let bytes = rest.as_bytes();
    for (pos, &b) in bytes.iter().enumerate() {
        if b == b'#' && pos > 0 && (bytes[pos - 1] == b' ' || bytes[pos - 1] == b'\t') {
            let mut gap_start = pos;
            while gap_start > 0 && (bytes[gap_start - 1] == b' ' || bytes[gap_start - 1] == b'\t') {
                gap_start -= 1;
            }
            return (&rest[..gap_start], Some(rest[gap_start..].to_string()));
        }
    }
    (rest, None)
}

/// Parse a literal block header plus its content lines into the string it
/// reloads as, honoring indentation indicators and chomping.
fn parse_literal(trimmed: &str, span: &[&str], indent: usize) -> (EntryValue, Option<String>) {
    let header = &trimmed[1..];
    let mut indicator: Option<usize> = None;
    let mut chomping = Chomping::Clip;
    let mut pos = 0;
    for c in header.chars() {
        match c {
            '1'..='9' if indicator.is_none() => indicator = Some(c as usize - '0' as usize),
            '-' => chomping = Chomping::Strip,
            '+' => chomping = Chomping::Keep,
            _ => break,
        }
        pos += c.len_utf8();
    }
    let after = &header[pos..];
    let comment = trailing_comment(after);
    if !after_is_clean(after) {
        return (EntryValue::Opaque, comment);
    }

    let content_lines = &span[1..];
    let block_indent = match indicator {
        Some(extra) => indent + extra,
        None => match content_lines
            .iter()
            .find(|l| !l.trim().is_empty())
        {
            Some(line) => leading_spaces(line),
            None => indent + 1,
        },
    };

    let mut extracted: Vec<&str> = Vec::with_capacity(content_lines.len());
    for line in content_lines {
        if line.trim().is_empty() {
            extracted.push(if line.len() > block_indent {
                &line[block_indent..]
            } else {
                ""
            });
        } else if leading_spaces(line) >= block_indent {
            extracted.push(&line[block_indent..]);
        } else {
            // Content shallower than the block indent; not a shape we can
            // model, so the entry is opaque.
            return (EntryValue::Opaque, comment);
        }
    }

    let mut trailing_empty = 0;
    while trailing_empty < extracted.len()
        && extracted[extracted.len() - 1 - trailing_empty].is_empty()
    {
        trailing_empty += 1;
    }
    let body = extracted[..extracted.len() - trailing_empty].join("\n");

    let content = match chomping {
        Chomping::Strip => body,
        Chomping::Clip => {
            if body.is_empty() {
                String::new()
            } else {
                format!("{body}\n")
            }
        }
        Chomping::Keep => {
            if extracted.is_empty() {
                String::new()
            } else {
                let mut text = extracted.join("\n");
                text.push('\n');
                text
            }
        }
    };

    (
        EntryValue::Scalar(ScalarValue {
            content,
            style: ScalarStyle::Literal,
        }),
        comment,
    )
}

/// Comment after a folded block header, if any.
fn block_header_comment(header: &str) -> Option<String> {
    let start = header
        .char_indices()
        .find(|(_, c)| !matches!(c, '1'..='9' | '-' | '+'))
        .map(|(pos, _)| pos)
        .unwrap_or(header.len());
    trailing_comment(&header[start..])
}

enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// Render a key for a freshly appended entry: plain when that reloads as
/// the same string, double-quoted otherwise.
fn render_key(key: &str) -> String {
    let plain_safe = !key.is_empty()
        && plain_is_stringy(key)
        && !key.starts_with('-')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'));
    if plain_safe {
        key.to_string()
    } else {
        format!("\"{}\"", scalar::escape_double_quoted(key))
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
