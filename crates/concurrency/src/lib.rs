//! Concurrency layer for deploy attempts
//!
//! This crate implements single-flight control for snapshot deploys:
//! - LocalLockTable: in-process non-blocking lock table keyed by database name
//! - DeployLockGuard: releases a held deploy lock on every exit path
//! - DeployLockCoordinator: runs a deploy only if its lock is free, skips otherwise

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lock;

pub use lock::{DeployLockCoordinator, DeployLockGuard, LocalLockTable, LockMetrics, LockOutcome};
