//! Chunked snapshot transfer
//!
//! Streams a snapshot file to the requesting node with window size 1: one
//! `CopyDatabaseChunk` in flight at a time, each blocking for its ack.
//!
//! ## Algorithm
//!
//! ```text
//! sent = 0, buffer = []
//! while sent < size or buffer holds refused bytes:
//!     append up to chunk_size bytes to buffer     (sent += n)
//!     ack = apply_chunk(buffer)                   (blocks)
//!     if ack: buffer = []
//! ```
//!
//! Under `NackPolicy::Accumulate` a refused buffer is kept and grows with the
//! next read, so every resend is a prefix extension of the refused one. Once
//! the file is exhausted the pending buffer is resent as-is until acked.
//! Under `NackPolicy::RetrySameChunk` nothing new is read while a buffer is
//! pending.
//!
//! Never reads past the size captured after export, even if the file grew.

use std::fs::File;
use std::io::Read;
use strata_core::{
    format_size, ChunkTransport, CopyDatabaseChunk, DatabaseName, NodeId, TransferError,
};
use strata_durability::{DeployConfig, NackPolicy, SnapshotInfo};
use tracing::{debug, warn};

/// Counters for one transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Chunk commands sent, including resends
    pub chunks_sent: u64,
    /// Negative acknowledgments received
    pub nacks: u64,
    /// Bytes read from the snapshot
    pub bytes_read: u64,
    /// Bytes put on the wire, including resent bytes
    pub bytes_sent: u64,
}

/// Sends one snapshot to one destination
pub struct ChunkSender<'a> {
    transport: &'a dyn ChunkTransport,
    database: &'a DatabaseName,
    local_node: &'a NodeId,
    chunk_size: usize,
    nack_policy: NackPolicy,
    max_consecutive_nacks: Option<u32>,
}

impl<'a> ChunkSender<'a> {
    /// Create a sender using the chunking settings from `config`
    pub fn new(
        transport: &'a dyn ChunkTransport,
        database: &'a DatabaseName,
        local_node: &'a NodeId,
        config: &DeployConfig,
    ) -> Self {
        ChunkSender {
            transport,
            database,
            local_node,
            chunk_size: config.chunk_size,
            nack_policy: config.nack_policy,
            max_consecutive_nacks: config.max_consecutive_nacks,
        }
    }

    /// Send the snapshot file to `destination`
    pub fn send(
        &self,
        snapshot: &SnapshotInfo,
        destination: &NodeId,
    ) -> Result<TransferStats, TransferError> {
        let file =
            File::open(&snapshot.path).map_err(|source| TransferError::Read { sent: 0, source })?;

        warn!(
            target: "strata::transfer",
            database = %self.database,
            destination = %destination,
            size = %format_size(snapshot.size_bytes),
            "Copying snapshot to remote node"
        );

        self.send_from(file, snapshot.size_bytes, destination)
    }

    /// Send exactly `size_bytes` bytes from `reader` to `destination`
    pub fn send_from<R: Read>(
        &self,
        mut reader: R,
        size_bytes: u64,
        destination: &NodeId,
    ) -> Result<TransferStats, TransferError> {
        let mut stats = TransferStats::default();
        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut sent: u64 = 0;
        let mut pending = false;
        let mut consecutive_nacks: u32 = 0;

        while sent < size_bytes || pending {
            let hold = pending && self.nack_policy == NackPolicy::RetrySameChunk;
            if sent < size_bytes && !hold {
                let want = (self.chunk_size as u64).min(size_bytes - sent);
                let read = (&mut reader)
                    .take(want)
                    .read_to_end(&mut buffer)
                    .map_err(|source| TransferError::Read { sent, source })?
                    as u64;
                if read == 0 {
                    return Err(TransferError::UnexpectedEof {
                        sent,
                        expected: size_bytes,
                    });
                }
                sent += read;
                stats.bytes_read += read;
            }

            let chunk_index = stats.chunks_sent;
            let chunk = CopyDatabaseChunk::new(
                self.database.clone(),
                self.local_node.clone(),
                std::mem::take(&mut buffer),
            );
            let result = self.transport.apply_chunk(destination, &chunk);
            stats.chunks_sent += 1;
            stats.bytes_sent += chunk.len() as u64;
            buffer = chunk.into_bytes();

            let acked = result.map_err(|source| TransferError::Transport {
                chunk: chunk_index,
                source,
            })?;

            debug!(
                target: "strata::transfer",
                database = %self.database,
                chunk = chunk_index,
                len = buffer.len(),
                acked,
                sent,
                total = size_bytes,
                "Chunk sent"
            );

            if acked {
                buffer.clear();
                pending = false;
                consecutive_nacks = 0;
            } else {
                pending = true;
                consecutive_nacks += 1;
                stats.nacks += 1;
                if let Some(max) = self.max_consecutive_nacks {
                    if consecutive_nacks >= max {
                        return Err(TransferError::Rejected { consecutive_nacks });
                    }
                }
            }
        }

        Ok(stats)
    }
}
