//! Collaborator traits
//!
//! The deploy protocol coordinates three things it does not own:
//! - SnapshotSource: the open database (freeze barrier + export mechanism)
//! - ChunkTransport: the RPC layer that delivers chunk commands to a peer
//! - LockProvider: the cluster's per-database lock service
//!
//! All are `Send + Sync` so a single deploy context can be shared across the
//! dispatcher's worker threads.

use crate::command::CopyDatabaseChunk;
use crate::error::{SnapshotError, TransportError};
use crate::types::NodeId;
use std::path::Path;

/// Where an export should be written
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    /// Final snapshot file
    pub target: &'a Path,
    /// Scratch directory the exporter may use; removed after every attempt
    pub workspace: &'a Path,
}

/// An open database that can be frozen and exported
///
/// The byte format of the export belongs to the implementor.
pub trait SnapshotSource: Send + Sync {
    /// Name of the database behind this handle
    fn name(&self) -> &str;

    /// Suspend new mutations so an export sees a consistent state
    fn freeze(&self) -> Result<(), SnapshotError>;

    /// Resume mutations after `freeze`
    ///
    /// Called exactly once for every successful `freeze`, including when the
    /// export fails.
    fn release(&self);

    /// Write the frozen database to `request.target`
    fn export(&self, request: &ExportRequest<'_>) -> Result<(), SnapshotError>;
}

/// Delivers chunk-apply commands to a remote node
///
/// `apply_chunk` blocks until the destination answers. There is no timeout in
/// the deploy protocol itself: implementations must enforce their own and
/// report it as `TransportError::Timeout`, otherwise a stalled peer blocks the
/// deploying worker indefinitely.
pub trait ChunkTransport: Send + Sync {
    /// Send one chunk and wait for its acknowledgment
    ///
    /// Returns `Ok(true)` if the destination applied the chunk, `Ok(false)`
    /// if it did not and the sender must not advance.
    fn apply_chunk(
        &self,
        destination: &NodeId,
        chunk: &CopyDatabaseChunk,
    ) -> Result<bool, TransportError>;
}

/// Non-blocking exclusive locks keyed by name
pub trait LockProvider: Send + Sync {
    /// Try to take the lock for `key` without waiting
    ///
    /// Returns `true` if the caller now holds the lock.
    fn try_acquire(&self, key: &str) -> bool;

    /// Release a lock previously taken with `try_acquire`
    fn release(&self, key: &str);
}
