//! Deploy engine for Strata clusters
//!
//! This crate orchestrates all lower layers:
//! - DeployDatabaseTask: the replicated command a node executes to ship a database
//! - DeployContext: per-node configuration, lock service and transport
//! - ChunkSender: ack-gated, window-size-1 snapshot streaming
//!
//! The engine is the only component that knows about:
//! - Lock / cleanup / freeze nesting
//! - Which node receives the chunks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod task;
pub mod transfer;

pub use context::DeployContext;
pub use task::DeployDatabaseTask;
pub use transfer::{ChunkSender, TransferStats};
