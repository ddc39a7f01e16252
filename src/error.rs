//! Error types for the propmap CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for propmap operations.
///
/// Each variant maps to one tier of the error taxonomy and carries a
/// pre-formatted, user-actionable message. All failures are fatal: there is
/// no retry tier and no partial recovery.
#[derive(Error, Debug)]
pub enum PropmapError {
    /// Bad arguments or an unreadable properties file.
    #[error("{0}")]
    UserError(String),

    /// The values document is missing, unparsable, or ill-formed.
    #[error("invalid values document: {0}")]
    DocumentError(String),

    /// The merged document could not be written to the output path.
    #[error("write failed: {0}")]
    WriteError(String),
}

impl PropmapError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PropmapError::UserError(_) => exit_codes::USER_ERROR,
            PropmapError::DocumentError(_) => exit_codes::DOCUMENT_ERROR,
            PropmapError::WriteError(_) => exit_codes::WRITE_FAILURE,
        }
    }
}

/// Result type alias for propmap operations.
pub type Result<T> = std::result::Result<T, PropmapError>;
