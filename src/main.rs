//! Propmap: sync flat properties files into the configmap block of a values.yaml.
//!
//! This is the main entry point for the `propmap` CLI. It parses arguments,
//! runs the merge, and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod configmap;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod properties;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
