//! Durability layer for deploy attempts
//!
//! This crate handles everything a deploy touches on disk:
//!
//! - Paths: snapshot files and exporter scratch space under the working root
//! - Config: `deploy.toml` loading and validation
//! - Snapshot: freeze / export / release with guaranteed release
//! - Cleaner: unconditional removal of exporter scratch space

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaner; // Best-effort working-storage cleanup
pub mod database; // Paths and configuration
pub mod snapshot; // Consistent snapshot producer

pub use cleaner::{CleanupGuard, WorkspaceCleaner};
pub use database::{
    ConfigError, DeployConfig, DeployPaths, NackPolicy, CONFIG_FILE_NAME, DEFAULT_BACKUP_DIR,
    DEFAULT_CHUNK_SIZE, DEFAULT_EXPORT_DIR,
};
pub use snapshot::{SnapshotInfo, SnapshotProducer};
