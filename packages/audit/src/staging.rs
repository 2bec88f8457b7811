//! Scoped ownership of the locally staged video file.
//!
//! The staged download is a per-run exclusive resource that must be
//! gone before the ingestion call returns, whether processing
//! succeeded, timed out, or blew up mid-flight. [`StagedFile`] ties the
//! deletion to scope exit.

use std::path::{Path, PathBuf};

/// Guard over a staged file; deletes it on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Take ownership of a file that already exists on disk.
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Best-effort: a leftover temp file is worth a warning, not a panic.
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}
