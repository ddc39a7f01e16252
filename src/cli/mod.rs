//! CLI argument parsing for propmap.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the argument surface; the actual implementation
//! is in the `commands` module.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Propmap: sync a flat properties file into the configmap block of a
/// values.yaml.
///
/// Reads a line-oriented properties file (`key=value` / `key:value`,
/// `#` comments, bracketed multi-line values), formats each value with a
/// stable quoting rule, and merges the result into the `configmap:` mapping
/// of a YAML values document. Lines the merge does not touch are preserved
/// byte for byte, and the document is only rewritten when something
/// actually changed.
#[derive(Parser, Debug)]
#[command(name = "propmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the input properties file.
    pub properties_file: PathBuf,

    /// Values document to update.
    #[arg(long, default_value = "values.yaml")]
    pub values: PathBuf,

    /// Where to write the result; defaults to the values document itself.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Keep configmap keys that no longer appear in the properties file.
    #[arg(long)]
    pub keep_unmatched: bool,

    /// Compute and report the merge without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Effective output path.
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.values)
    }

    /// Whether configmap keys absent from the properties file get deleted.
    pub fn remove_unmatched(&self) -> bool {
        !self.keep_unmatched
    }
}
