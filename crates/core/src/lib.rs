//! Core types and traits for the Strata deploy protocol
//!
//! This crate defines the foundational types used throughout the system:
//! - DatabaseName / NodeId / TaskId: identities carried by every command
//! - DeployOutcome: terminal result of a deploy attempt
//! - Error: error enums for each layer (snapshot, transfer, transport)
//! - Traits: collaborators the protocol drives (SnapshotSource, ChunkTransport, LockProvider)
//! - Command: replicated command envelope and the chunk-apply command

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod size;
pub mod traits;
pub mod types;

pub use command::{CommandEnvelope, CommandHeader, CopyDatabaseChunk, ReplicatedCommand};
pub use error::{
    CommandError, DeployError, DeployResult, SnapshotError, TransferError, TransportError,
};
pub use size::format_size;
pub use traits::{ChunkTransport, ExportRequest, LockProvider, SnapshotSource};
pub use types::{
    DatabaseName, DatabaseNameError, DeployOutcome, NodeId, TaskId, MAX_DATABASE_NAME_LENGTH,
};
