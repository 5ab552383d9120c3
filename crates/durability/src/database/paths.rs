//! Deploy working directory structure
//!
//! A deploy attempt touches two locations under the node's working root:
//!
//! ```text
//! {working_root}/
//! ├── tempBackups/         # Snapshot files, one per database
//! │   ├── orders
//! │   └── ...
//! └── exportDatabase/      # Exporter scratch space
//!     ├── orders/          # One per attempt in flight, removed when it ends
//!     └── ...
//! ```
//!
//! Deploys of different databases run side by side, so each gets its own
//! scratch directory. Both directory names are configurable (see
//! `DeployConfig`).

use std::io;
use std::path::{Path, PathBuf};
use strata_core::DatabaseName;

use super::config::{DEFAULT_BACKUP_DIR, DEFAULT_EXPORT_DIR};

/// Deploy directory paths
///
/// Provides access to all paths used by one node's deploy attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    /// Working root
    root: PathBuf,
    /// Directory name for snapshot files
    backup_dir: String,
    /// Directory name for exporter scratch space
    export_dir: String,
}

impl DeployPaths {
    /// Create paths from a working root with the default directory names
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        DeployPaths {
            root: root.as_ref().to_path_buf(),
            backup_dir: DEFAULT_BACKUP_DIR.to_string(),
            export_dir: DEFAULT_EXPORT_DIR.to_string(),
        }
    }

    /// Override the directory names
    pub fn with_dir_names(
        mut self,
        backup_dir: impl Into<String>,
        export_dir: impl Into<String>,
    ) -> Self {
        self.backup_dir = backup_dir.into();
        self.export_dir = export_dir.into();
        self
    }

    /// Get the working root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory holding snapshot files
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(&self.backup_dir)
    }

    /// Get the snapshot file path for a database
    pub fn snapshot_file(&self, database: &DatabaseName) -> PathBuf {
        self.backup_dir().join(database.as_str())
    }

    /// Get the directory holding every attempt's scratch space
    pub fn export_root(&self) -> PathBuf {
        self.root.join(&self.export_dir)
    }

    /// Get the exporter scratch directory for a database
    pub fn export_workspace(&self, database: &DatabaseName) -> PathBuf {
        self.export_root().join(database.as_str())
    }

    /// Create the snapshot directory and the scratch directory for `database`
    pub fn create_directories(&self, database: &DatabaseName) -> io::Result<()> {
        std::fs::create_dir_all(self.backup_dir())?;
        let workspace = self.export_workspace(database);
        match std::fs::create_dir_all(&workspace) {
            // Another attempt's cleanup may prune the empty export root in between
            Err(e) if e.kind() == io::ErrorKind::NotFound => std::fs::create_dir_all(&workspace),
            other => other,
        }
    }
}
