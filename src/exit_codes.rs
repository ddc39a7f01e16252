//! Exit code constants for the propmap CLI.
//!
//! One code per error tier:
//! - 0: Success
//! - 1: User error (bad args, unreadable properties file)
//! - 2: Document error (values YAML missing, unparsable, or ill-formed)
//! - 3: Write failure (output path not writable)
//!
//! These apply to errors surfaced through [`crate::error::PropmapError`].
//! Malformed command lines never reach that type: clap reports them itself
//! and exits with its conventional usage-error code (2).

/// Successful execution, including runs that change nothing.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an unreadable properties file.
pub const USER_ERROR: i32 = 1;

/// Document error: the values YAML is missing, unparsable, or ill-formed.
pub const DOCUMENT_ERROR: i32 = 2;

/// Write failure: the merged document could not be persisted.
pub const WRITE_FAILURE: i32 = 3;
