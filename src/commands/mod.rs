//! Command implementation for propmap.
//!
//! The CLI exposes a single operation: load the properties file, merge it
//! into the values document's configmap, and report what changed. With
//! `--dry-run` the merge is computed but nothing is written.

use crate::cli::Cli;
use crate::configmap::{self, MergeOutcome, ValuesDocument};
use crate::error::Result;
use crate::properties::Properties;

/// Run the conversion described by the parsed CLI arguments.
pub fn run(cli: &Cli) -> Result<()> {
    let properties = Properties::load(&cli.properties_file)?;

    let outcome = if cli.dry_run {
        let mut doc = ValuesDocument::load(&cli.values)?;
        configmap::apply_properties(&mut doc, &properties, cli.remove_unmatched())
    } else {
        configmap::update_configmap(
            &properties,
            &cli.values,
            cli.output_path(),
            cli.remove_unmatched(),
        )?
        .outcome
    };

    println!("{}", report_line(cli, &outcome));
    Ok(())
}

/// One-line summary of what the run changed.
fn report_line(cli: &Cli, outcome: &MergeOutcome) -> String {
    if !outcome.is_dirty() {
        format!("{} already up to date", cli.values.display())
    } else if cli.dry_run {
        format!(
            "Dry run: {} added, {} updated, {} removed; {} not modified",
            outcome.added,
            outcome.updated,
            outcome.removed,
            cli.output_path().display()
        )
    } else {
        format!(
            "Wrote {}: {} added, {} updated, {} removed",
            cli.output_path().display(),
            outcome.added,
            outcome.updated,
            outcome.removed
        )
    }
}
