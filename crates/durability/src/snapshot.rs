//! Consistent snapshot production
//!
//! This module exports a database to its deterministic snapshot path with:
//! - A freeze barrier held only for the duration of the export
//! - Guaranteed release of the barrier on every exit path (`FreezeGuard`)
//! - The snapshot length captured once, after the export completes
//!
//! ## Sequence
//!
//! ```text
//! 1. create {working_root}/{backup_dir} and {export_dir}/{database}
//! 2. freeze()                  -- failure aborts, nothing to release
//! 3. export(target, workspace) -- under FreezeGuard
//! 4. release()                 -- FreezeGuard drop, also on error/panic
//! 5. metadata(target).len()    -- fixed transfer target
//! ```

use crate::database::DeployPaths;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use strata_core::{format_size, DatabaseName, ExportRequest, SnapshotError, SnapshotSource};
use tracing::{debug, warn};

/// Information about a produced snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Database that was exported
    pub database: DatabaseName,
    /// Snapshot file
    pub path: PathBuf,
    /// File length right after export; the transfer sends exactly this many bytes
    pub size_bytes: u64,
    /// Time spent frozen and exporting
    pub export_duration: Duration,
}

/// Holds a database frozen; releases it on drop
struct FreezeGuard<'a> {
    source: &'a dyn SnapshotSource,
}

impl<'a> FreezeGuard<'a> {
    fn freeze(source: &'a dyn SnapshotSource) -> Result<Self, SnapshotError> {
        source.freeze()?;
        debug!(target: "strata::snapshot", database = source.name(), "Database frozen");
        Ok(FreezeGuard { source })
    }
}

impl Drop for FreezeGuard<'_> {
    fn drop(&mut self) {
        self.source.release();
        debug!(target: "strata::snapshot", database = self.source.name(), "Database released");
    }
}

/// Produces point-in-time snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotProducer {
    paths: DeployPaths,
}

impl SnapshotProducer {
    /// Create a producer writing under `paths`
    pub fn new(paths: DeployPaths) -> Self {
        SnapshotProducer { paths }
    }

    /// Get the paths this producer writes to
    pub fn paths(&self) -> &DeployPaths {
        &self.paths
    }

    /// Freeze `source`, export it to its snapshot file, release it
    ///
    /// The release runs even if the export fails; the export error is then
    /// returned. The returned `size_bytes` is read once and never refreshed.
    pub fn produce(
        &self,
        database: &DatabaseName,
        source: &dyn SnapshotSource,
    ) -> Result<SnapshotInfo, SnapshotError> {
        let target = self.paths.snapshot_file(database);
        let workspace = self.paths.export_workspace(database);
        self.paths.create_directories(database)?;

        warn!(
            target: "strata::snapshot",
            database = %database,
            path = %target.display(),
            "Exporting database"
        );

        let started = Instant::now();
        {
            let _frozen = FreezeGuard::freeze(source)?;
            source.export(&ExportRequest {
                target: &target,
                workspace: &workspace,
            })?;
        }
        let export_duration = started.elapsed();

        let size_bytes = std::fs::metadata(&target)?.len();

        warn!(
            target: "strata::snapshot",
            database = %database,
            size = %format_size(size_bytes),
            size_bytes,
            elapsed_ms = export_duration.as_millis() as u64,
            "Database exported"
        );

        Ok(SnapshotInfo {
            database: database.clone(),
            path: target,
            size_bytes,
            export_duration,
        })
    }
}
