//! Filesystem utilities for propmap.
//!
//! Atomic writes keep the values document intact across crashes and
//! interruptions: readers see either the old document or the new one.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
