//! Line-oriented parser for properties files.
//!
//! The parser is a small state machine over trailing-whitespace-stripped
//! lines. Outside multi-line mode, any line containing `=` or `:` starts a
//! new entry; the line splits on the first `=` when one is present, else on
//! the first `:`. A trimmed value ending in `\`, `[`, or `{` switches the
//! machine into multi-line mode, where subsequent lines are collected
//! verbatim until one ends in `]` or `}` without a trailing `\` or `,/`.
//!
//! Finalizing an entry joins its collected lines with `\n`, rewrites the
//! `,/` continuation marker to `,`, and strips every backslash.

use indexmap::IndexMap;

/// Parse properties file content into an ordered key/value map.
pub(crate) fn parse(content: &str) -> IndexMap<String, String> {
    let mut properties: IndexMap<String, String> = IndexMap::new();
    let mut current_key: Option<String> = None;
    let mut value_lines: Vec<String> = Vec::new();
    let mut inside_multiline = false;

    for raw_line in content.lines() {
        let line = raw_line.trim_end();

        // Blank and comment lines are skipped in every state, including
        // multi-line mode.
        if line.is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let delimited = if inside_multiline {
            None
        } else if let Some(pair) = line.split_once('=') {
            Some(pair)
        } else {
            line.split_once(':')
        };

        if let Some((key, value)) = delimited {
            if let Some(finished) = current_key.take() {
                properties.insert(finished, finalize(&value_lines));
            }
            let value = value.trim();
            current_key = Some(key.trim().to_string());
            value_lines = vec![value.to_string()];
            inside_multiline =
                value.ends_with('\\') || value.ends_with('[') || value.ends_with('{');
        } else if inside_multiline {
            value_lines.push(line.to_string());
            if closes_multiline(line) {
                inside_multiline = false;
            }
        } else if current_key.is_some() {
            // Continuation of a single-line value that spilled over without
            // any multi-line marker.
            value_lines.push(line.trim().to_string());
        }
        // Lines before the first entry that carry no delimiter are dropped.
    }

    if let Some(finished) = current_key {
        properties.insert(finished, finalize(&value_lines));
    }

    properties
}

/// A multi-line value ends on a closing bracket line, unless that line is
/// itself continued with `\` or the `,/` marker.
fn closes_multiline(line: &str) -> bool {
    (line.ends_with(']') || line.ends_with('}'))
        && !(line.ends_with('\\') || line.ends_with(",/"))
}

fn finalize(lines: &[String]) -> String {
    lines.join("\n").replace(",/", ",").replace('\\', "")
}
