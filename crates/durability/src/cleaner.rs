//! Working-storage cleanup
//!
//! The exporter scratch directory is removed after every deploy attempt,
//! whatever its outcome. Cleanup is best effort: failures are logged and
//! never replace the attempt's own result.
//!
//! # Design Notes
//!
//! - `CleanupGuard` runs cleanup from `Drop`, so early returns and panics
//!   inside the attempt still clean up
//! - A directory that is already absent counts as cleaned
//! - Only the attempt's own scratch directory is removed; the shared parent
//!   set with `with_parent` goes only once it is empty
//! - The snapshot file is kept unless `with_snapshot` is used

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Removes transient export storage
#[derive(Debug, Clone)]
pub struct WorkspaceCleaner {
    /// Exporter scratch directory
    workspace: PathBuf,
    /// Shared directory to prune once no attempt uses it
    parent: Option<PathBuf>,
    /// Snapshot file to delete as well, if not retained
    snapshot: Option<PathBuf>,
}

impl WorkspaceCleaner {
    /// Create a cleaner for the scratch directory
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        WorkspaceCleaner {
            workspace: workspace.into(),
            parent: None,
            snapshot: None,
        }
    }

    /// Also remove `parent` on cleanup if nothing else is left in it
    pub fn with_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Also delete `snapshot` on cleanup
    pub fn with_snapshot(mut self, snapshot: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    /// Remove the scratch directory (and the snapshot, if configured)
    ///
    /// Returns `true` if everything is gone afterwards. Never fails.
    pub fn cleanup(&self) -> bool {
        let mut clean = true;

        match remove_dir_if_exists(&self.workspace) {
            Ok(()) => {
                debug!(
                    target: "strata::cleanup",
                    path = %self.workspace.display(),
                    "Export workspace removed"
                );
            }
            Err(e) => {
                warn!(
                    target: "strata::cleanup",
                    path = %self.workspace.display(),
                    error = %e,
                    "Failed to remove export workspace"
                );
                clean = false;
            }
        }

        if let Some(ref parent) = self.parent {
            // Fails while other attempts still have scratch space in it
            if std::fs::remove_dir(parent).is_ok() {
                debug!(target: "strata::cleanup", path = %parent.display(), "Export root removed");
            }
        }

        if let Some(ref snapshot) = self.snapshot {
            if let Err(e) = remove_file_if_exists(snapshot) {
                warn!(
                    target: "strata::cleanup",
                    path = %snapshot.display(),
                    error = %e,
                    "Failed to remove snapshot file"
                );
                clean = false;
            }
        }

        clean
    }

    /// Run `cleanup` when the returned guard is dropped
    pub fn guard(self) -> CleanupGuard {
        CleanupGuard { cleaner: self }
    }
}

/// Cleans up working storage on drop
#[derive(Debug)]
pub struct CleanupGuard {
    cleaner: WorkspaceCleaner,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.cleaner.cleanup();
    }
}

fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
