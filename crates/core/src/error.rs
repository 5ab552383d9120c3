//! Error types for deploy attempts
//!
//! Each layer has its own error enum; `DeployError` is what a caller of the
//! deploy task sees. A lock that is already held is not an error: it is
//! reported as `DeployOutcome::Skipped`.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::{DatabaseName, DatabaseNameError};
use std::io;
use thiserror::Error;

/// Result type alias for deploy operations
pub type DeployResult<T> = std::result::Result<T, DeployError>;

/// Top-level error returned by a deploy attempt
#[derive(Debug, Error)]
pub enum DeployError {
    /// Database name is not a safe path component
    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(#[from] DatabaseNameError),

    /// The open database handle does not belong to the requested database
    #[error("Database handle is '{actual}' but task targets '{expected}'")]
    DatabaseMismatch {
        /// Database named by the task
        expected: DatabaseName,
        /// Name reported by the handle
        actual: String,
    },

    /// Deploy configuration rejected
    #[error("Invalid deploy config: {0}")]
    Config(String),

    /// Freeze or export failed
    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Chunk read or remote send failed
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Errors from producing a consistent snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The database refused to freeze
    #[error("freeze failed: {0}")]
    Freeze(String),

    /// The export mechanism failed while the database was frozen
    #[error("export failed: {0}")]
    Export(String),

    /// I/O error around the export (directories, file metadata)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from streaming a snapshot to a peer
#[derive(Debug, Error)]
pub enum TransferError {
    /// Reading the snapshot file failed
    #[error("read failed after {sent} bytes: {source}")]
    Read {
        /// Bytes read before the failure
        sent: u64,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The snapshot file ended before its captured length
    #[error("snapshot ended at {sent} bytes, expected {expected}")]
    UnexpectedEof {
        /// Bytes read before end of file
        sent: u64,
        /// Length captured after export
        expected: u64,
    },

    /// The transport failed to deliver a chunk or collect its ack
    #[error("chunk {chunk} not delivered: {source}")]
    Transport {
        /// Zero-based index of the send that failed
        chunk: u64,
        /// Underlying transport error
        #[source]
        source: TransportError,
    },

    /// The destination kept refusing chunks
    #[error("destination rejected {consecutive_nacks} consecutive chunks")]
    Rejected {
        /// Number of negative acknowledgments in a row
        consecutive_nacks: u32,
    },
}

/// Errors reported by a `ChunkTransport`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Destination node could not be reached
    #[error("node unreachable: {0}")]
    Unreachable(String),

    /// No response within the transport's own deadline
    #[error("timed out waiting for response")]
    Timeout,

    /// Destination raised an error while handling the command
    #[error("remote error: {0}")]
    Remote(String),
}

/// Errors from encoding or decoding command envelopes
#[derive(Debug, Error)]
pub enum CommandError {
    /// MessagePack encoding failed
    #[error("encode failed: {0}")]
    Encode(String),

    /// MessagePack decoding failed
    #[error("decode failed: {0}")]
    Decode(String),

    /// Envelope carries a different command
    #[error("expected command '{expected}', got '{actual}'")]
    UnexpectedCommand {
        /// Command name the decoder handles
        expected: &'static str,
        /// Command name found in the envelope
        actual: String,
    },

    /// Payload presence does not match the command
    #[error("unexpected payload for command '{0}'")]
    UnexpectedPayload(&'static str),
}
