//! Configmap handling for propmap.
//!
//! This module owns everything on the YAML side of the conversion: choosing
//! a presentation for each properties value, parsing the `configmap:` block
//! of a values document while keeping every other line verbatim, and merging
//! properties into it with a conditional, atomic write.

mod io;
mod merge;
mod scalar;
mod section;

#[cfg(test)]
mod tests;

// Re-export public API
pub use io::ValuesDocument;
pub use merge::{MergeOutcome, MergeReport, apply_properties, update_configmap};
pub use scalar::{ScalarStyle, ScalarValue, format_value};
