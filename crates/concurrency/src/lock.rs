//! Per-database deploy locks
//!
//! Many peers can ask for the same database at once (for example several
//! replicas joining together). Only the first request that takes the lock
//! runs the export; the others return `LockOutcome::Skipped` immediately and
//! are expected to retry on their own schedule.
//!
//! ## Guarantees
//!
//! - `try_run` never waits for a lock
//! - A skipped attempt never runs its work closure
//! - A held lock is released exactly once, on success, error or panic

use dashmap::DashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strata_core::{DatabaseName, LockProvider};
use tracing::debug;

/// In-process lock table
///
/// Locks are not reentrant: a second `try_acquire` for a held key fails,
/// even from the thread that holds it.
#[derive(Debug, Default)]
pub struct LocalLockTable {
    held: DashSet<String>,
}

impl LocalLockTable {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is currently held
    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Number of keys currently held
    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

impl LockProvider for LocalLockTable {
    fn try_acquire(&self, key: &str) -> bool {
        self.held.insert(key.to_string())
    }

    fn release(&self, key: &str) {
        self.held.remove(key);
    }
}

/// A held deploy lock, released on drop
pub struct DeployLockGuard<'a> {
    provider: &'a dyn LockProvider,
    database: &'a DatabaseName,
}

impl<'a> DeployLockGuard<'a> {
    /// Database this guard locks
    pub fn database(&self) -> &DatabaseName {
        self.database
    }
}

impl Drop for DeployLockGuard<'_> {
    fn drop(&mut self) {
        self.provider.release(self.database.as_str());
        debug!(target: "strata::lock", database = %self.database, "Deploy lock released");
    }
}

/// Result of `DeployLockCoordinator::try_run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome<T> {
    /// The lock was taken and the work ran to completion
    Ran(T),
    /// The lock was held elsewhere; the work did not run
    Skipped,
}

/// Lock coordinator counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockMetrics {
    /// Attempts that took the lock
    pub acquired: u64,
    /// Attempts that found the lock held
    pub skipped: u64,
}

/// Gates deploy attempts on a per-database lock
///
/// The counters are observational only and use Relaxed ordering.
pub struct DeployLockCoordinator {
    provider: Arc<dyn LockProvider>,
    acquired: AtomicU64,
    skipped: AtomicU64,
}

impl DeployLockCoordinator {
    /// Create a coordinator over a cluster lock provider
    pub fn new(provider: Arc<dyn LockProvider>) -> Self {
        Self {
            provider,
            acquired: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Create a coordinator backed by a fresh `LocalLockTable`
    pub fn local() -> Self {
        Self::new(Arc::new(LocalLockTable::new()))
    }

    /// Try to take the deploy lock for `database` without waiting
    pub fn try_lock<'a>(&'a self, database: &'a DatabaseName) -> Option<DeployLockGuard<'a>> {
        if self.provider.try_acquire(database.as_str()) {
            self.acquired.fetch_add(1, Ordering::Relaxed);
            debug!(target: "strata::lock", database = %database, "Deploy lock acquired");
            Some(DeployLockGuard {
                provider: self.provider.as_ref(),
                database,
            })
        } else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Run `work` while holding the deploy lock for `database`
    ///
    /// Returns `Ok(LockOutcome::Skipped)` without calling `work` if the lock
    /// is held. Otherwise the lock is held for the whole of `work` and
    /// released when it returns or unwinds; its error is passed through.
    pub fn try_run<T, E>(
        &self,
        database: &DatabaseName,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<LockOutcome<T>, E> {
        let Some(_guard) = self.try_lock(database) else {
            return Ok(LockOutcome::Skipped);
        };
        work().map(LockOutcome::Ran)
    }

    /// Current counters
    pub fn metrics(&self) -> LockMetrics {
        LockMetrics {
            acquired: self.acquired.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DeployLockCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployLockCoordinator")
            .field("metrics", &self.metrics())
            .finish()
    }
}
