//! Strata deploy - snapshot shipping between cluster nodes
//!
//! A node that is missing a database asks a peer that has it to deploy it.
//! The peer takes a cluster-wide lock for the database, freezes it long
//! enough to export a consistent snapshot, and streams the snapshot back in
//! acknowledged chunks.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use strata_deploy::{DeployConfig, DeployContext, DeployDatabaseTask, NodeId};
//!
//! let config = DeployConfig::from_file(Path::new("deploy.toml"))?;
//! let ctx = DeployContext::new(config, NodeId::new("node-a"), locks, transport)?;
//!
//! let task = DeployDatabaseTask::try_new("orders", NodeId::new("node-b"))?;
//! let outcome = task.execute(&ctx, &database)?;
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: identities, commands, errors and collaborator traits
//! - `strata-concurrency`: the per-database single-flight lock
//! - `strata-durability`: configuration, paths, snapshot export and cleanup
//! - `strata-engine`: the deploy task and chunked transfer

pub use strata_concurrency::{DeployLockCoordinator, LocalLockTable, LockMetrics, LockOutcome};
pub use strata_core::*;
pub use strata_durability::{
    ConfigError, DeployConfig, DeployPaths, NackPolicy, SnapshotInfo, SnapshotProducer,
    WorkspaceCleaner, CONFIG_FILE_NAME,
};
pub use strata_engine::{ChunkSender, DeployContext, DeployDatabaseTask, TransferStats};
