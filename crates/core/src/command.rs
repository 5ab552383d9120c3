//! Replicated command envelope
//!
//! Every command exchanged between nodes shares a `CommandHeader` (identity,
//! target database, requesting node) and an optional raw payload. A deploy
//! request has no payload at all: which database it targets is the whole
//! request. A chunk-apply command carries the next slice of the snapshot
//! stream.
//!
//! ## Format
//!
//! Envelopes are serialized using MessagePack (`rmp-serde`).

use crate::error::CommandError;
use crate::types::{DatabaseName, NodeId, TaskId};
use serde::{Deserialize, Serialize};

/// Fields shared by every replicated command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHeader {
    /// Identity of this command instance
    pub id: TaskId,
    /// Database the command applies to
    pub database: DatabaseName,
    /// Node that issued the command
    pub source_node: NodeId,
}

impl CommandHeader {
    /// Create a header with a fresh task id
    pub fn new(database: DatabaseName, source_node: NodeId) -> Self {
        CommandHeader {
            id: TaskId::new(),
            database,
            source_node,
        }
    }
}

/// Serialized form of any replicated command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command name, used for dispatch on the receiving node
    pub name: String,
    /// Shared header
    pub header: CommandHeader,
    /// Command-specific bytes, if any
    pub payload: Option<Vec<u8>>,
}

impl CommandEnvelope {
    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CommandError> {
        rmp_serde::to_vec(self).map_err(|e| CommandError::Encode(e.to_string()))
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CommandError> {
        rmp_serde::from_slice(bytes).map_err(|e| CommandError::Decode(e.to_string()))
    }
}

/// A command that travels between nodes inside a `CommandEnvelope`
pub trait ReplicatedCommand: Sized {
    /// Dispatch name carried in the envelope
    const NAME: &'static str;

    /// Shared header
    fn header(&self) -> &CommandHeader;

    /// Command-specific bytes
    fn payload(&self) -> Option<&[u8]>;

    /// Rebuild the command from a decoded header and payload
    fn from_parts(header: CommandHeader, payload: Option<Vec<u8>>) -> Result<Self, CommandError>;

    /// Dispatch name of this command
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Wrap this command in an envelope
    fn to_envelope(&self) -> CommandEnvelope {
        CommandEnvelope {
            name: Self::NAME.to_string(),
            header: self.header().clone(),
            payload: self.payload().map(<[u8]>::to_vec),
        }
    }

    /// Unwrap an envelope, checking that it carries this command
    fn from_envelope(envelope: CommandEnvelope) -> Result<Self, CommandError> {
        if envelope.name != Self::NAME {
            return Err(CommandError::UnexpectedCommand {
                expected: Self::NAME,
                actual: envelope.name,
            });
        }
        Self::from_parts(envelope.header, envelope.payload)
    }
}

/// Apply the next slice of a snapshot stream on the destination node
///
/// Answered with `true` if the destination applied the bytes. Chunks carry no
/// offset: the destination appends them in the order it receives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDatabaseChunk {
    header: CommandHeader,
    payload: Vec<u8>,
}

impl CopyDatabaseChunk {
    /// Create a chunk command for `database`
    pub fn new(database: DatabaseName, source_node: NodeId, payload: Vec<u8>) -> Self {
        CopyDatabaseChunk {
            header: CommandHeader::new(database, source_node),
            payload,
        }
    }

    /// Bytes carried by this chunk
    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Number of bytes carried by this chunk
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the chunk carries no bytes
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Take the payload out of the command
    pub fn into_bytes(self) -> Vec<u8> {
        self.payload
    }
}

impl ReplicatedCommand for CopyDatabaseChunk {
    const NAME: &'static str = "copy_db_chunk";

    fn header(&self) -> &CommandHeader {
        &self.header
    }

    fn payload(&self) -> Option<&[u8]> {
        Some(&self.payload)
    }

    fn from_parts(header: CommandHeader, payload: Option<Vec<u8>>) -> Result<Self, CommandError> {
        let payload = payload.ok_or(CommandError::UnexpectedPayload(Self::NAME))?;
        Ok(CopyDatabaseChunk { header, payload })
    }
}
