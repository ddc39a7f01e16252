//! Merging parsed properties into a values document.

use crate::configmap::io::ValuesDocument;
use crate::configmap::scalar::format_value;
use crate::error::Result;
use crate::properties::Properties;
use std::collections::HashSet;
use std::path::Path;

/// Counts of what a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Keys added to the configmap.
    pub added: usize,
    /// Keys whose value was rewritten.
    pub updated: usize,
    /// Keys deleted because the properties no longer carry them.
    pub removed: usize,
}

impl MergeOutcome {
    /// Whether the document changed and needs to be persisted.
    pub fn is_dirty(&self) -> bool {
        self.added + self.updated + self.removed > 0
    }
}

/// Result of a full update run.
#[derive(Debug, Clone, Copy)]
pub struct MergeReport {
    pub outcome: MergeOutcome,
    /// Whether the document was written out.
    pub written: bool,
}

/// Apply properties to a loaded document.
///
/// Properties are walked in file order: a key missing from the configmap is
/// appended at the end of the section, a key whose entry does not already
/// carry the formatted content is rewritten in place. With
/// `remove_unmatched`, configmap keys absent from the properties are
/// deleted; their neighboring comments and blank lines stay.
pub fn apply_properties(
    doc: &mut ValuesDocument,
    properties: &Properties,
    remove_unmatched: bool,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    let unmatched: HashSet<String> = doc
        .parsed
        .entry_keys()
        .into_iter()
        .filter(|key| !properties.contains_key(key))
        .collect();

    let indent = doc.parsed.indent;
    for (key, raw) in properties.iter() {
        let formatted = format_value(raw);
        match doc.parsed.entry_mut(key) {
            Some(entry) => {
                if !entry.matches(&formatted) {
                    entry.rewrite(formatted, indent);
                    outcome.updated += 1;
                }
            }
            None => {
                doc.parsed.push_entry(key, formatted);
                outcome.added += 1;
            }
        }
    }

    if remove_unmatched && !unmatched.is_empty() {
        outcome.removed = doc
            .parsed
            .remove_entries(|key| unmatched.contains(key));
    }

    outcome
}

/// Update the configmap of the document at `values_path` with `properties`
/// and persist the result to `output_path`, but only when something
/// actually changed.
pub fn update_configmap(
    properties: &Properties,
    values_path: &Path,
    output_path: &Path,
    remove_unmatched: bool,
) -> Result<MergeReport> {
    let mut doc = ValuesDocument::load(values_path)?;
    let outcome = apply_properties(&mut doc, properties, remove_unmatched);
    let written = outcome.is_dirty();
    if written {
        doc.save(output_path)?;
    }
    Ok(MergeReport { outcome, written })
}
