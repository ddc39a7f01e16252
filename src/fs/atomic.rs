//! Atomic file writes for propmap.
//!
//! The merged values document must never be observed half-written, so every
//! write goes through the same sequence:
//! 1. Write the content to a temporary file in the target directory
//! 2. Sync the file to disk (fsync)
//! 3. Atomically rename it over the target
//!
//! On POSIX, `rename()` replaces the destination atomically when source and
//! destination share a filesystem. On other platforms the rename is preceded
//! by removing an existing destination, which narrows but does not fully
//! close the replacement window.
//!
//! A crash mid-write can leave a `.{filename}.tmp` file behind in the target
//! directory; the target itself is either the old content or the new content.

use crate::error::{PropmapError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write a string to a file.
///
/// Writes to a temporary sibling file, syncs it, then renames it over the
/// target so the target never holds partial content.
///
/// # Errors
///
/// Returns `PropmapError::WriteError` when the temporary file cannot be
/// created, written, synced, or renamed. The target file is untouched in
/// every failure case.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically write bytes to a file. See [`atomic_write_file`].
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            PropmapError::WriteError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    replace_file(&temp_path, path)?;

    Ok(())
}

/// Temporary file path in the same directory as the target.
///
/// The temp file must live next to the target so the final rename stays on
/// one filesystem.
fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PropmapError::WriteError(format!("invalid path '{}'", target.display())))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write content to a file and sync it to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        PropmapError::WriteError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let result = file
        .write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            PropmapError::WriteError(format!("failed to write temporary file: {}", e))
        });

    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

/// Rename the temporary file over the target.
#[cfg(unix)]
fn replace_file(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        PropmapError::WriteError(format!("failed to replace '{}': {}", target.display(), e))
    })?;

    // Sync the directory entry as well so the rename survives a crash.
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(not(unix))]
fn replace_file(source: &Path, target: &Path) -> Result<()> {
    // rename() does not replace an existing destination everywhere; remove
    // it first and accept the small non-atomic window.
    if target.exists() {
        fs::remove_file(target).map_err(|e| {
            let _ = fs::remove_file(source);
            PropmapError::WriteError(format!("failed to replace '{}': {}", target.display(), e))
        })?;
    }
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        PropmapError::WriteError(format!("failed to replace '{}': {}", target.display(), e))
    })
}
