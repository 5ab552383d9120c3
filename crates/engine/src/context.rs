//! Per-node deploy context
//!
//! Everything a deploy attempt needs besides the database handle: validated
//! configuration, the node's identity, the cluster lock service and the chunk
//! transport. One context is built per node and shared by every worker that
//! executes deploy tasks.

use std::sync::Arc;
use strata_concurrency::DeployLockCoordinator;
use strata_core::{ChunkTransport, DatabaseName, DeployError, DeployResult, LockProvider, NodeId};
use strata_durability::{DeployConfig, DeployPaths, SnapshotProducer, WorkspaceCleaner};

/// Shared state for executing deploy tasks on one node
pub struct DeployContext {
    config: DeployConfig,
    paths: DeployPaths,
    local_node: NodeId,
    locks: DeployLockCoordinator,
    transport: Arc<dyn ChunkTransport>,
}

impl DeployContext {
    /// Build a context, validating `config`
    pub fn new(
        config: DeployConfig,
        local_node: NodeId,
        locks: Arc<dyn LockProvider>,
        transport: Arc<dyn ChunkTransport>,
    ) -> DeployResult<Self> {
        config
            .validate()
            .map_err(|e| DeployError::Config(e.to_string()))?;
        Ok(DeployContext {
            paths: config.paths(),
            config,
            local_node,
            locks: DeployLockCoordinator::new(locks),
            transport,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Get the deploy paths
    pub fn paths(&self) -> &DeployPaths {
        &self.paths
    }

    /// Identity of this node, stamped on outgoing chunks
    pub fn local_node(&self) -> &NodeId {
        &self.local_node
    }

    /// Get the lock coordinator
    pub fn locks(&self) -> &DeployLockCoordinator {
        &self.locks
    }

    /// Get the chunk transport
    pub fn transport(&self) -> &dyn ChunkTransport {
        self.transport.as_ref()
    }

    pub(crate) fn producer(&self) -> SnapshotProducer {
        SnapshotProducer::new(self.paths.clone())
    }

    pub(crate) fn cleaner(&self, database: &DatabaseName) -> WorkspaceCleaner {
        let cleaner = WorkspaceCleaner::new(self.paths.export_workspace(database))
            .with_parent(self.paths.export_root());
        if self.config.retain_snapshot {
            cleaner
        } else {
            cleaner.with_snapshot(self.paths.snapshot_file(database))
        }
    }
}

impl std::fmt::Debug for DeployContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployContext")
            .field("config", &self.config)
            .field("local_node", &self.local_node)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_concurrency::LocalLockTable;
    use strata_core::{CopyDatabaseChunk, TransportError};

    struct NullTransport;

    impl ChunkTransport for NullTransport {
        fn apply_chunk(
            &self,
            _destination: &NodeId,
            _chunk: &CopyDatabaseChunk,
        ) -> Result<bool, TransportError> {
            Ok(true)
        }
    }

    fn context(config: DeployConfig) -> DeployResult<DeployContext> {
        DeployContext::new(
            config,
            NodeId::new("node-a"),
            Arc::new(LocalLockTable::new()),
            Arc::new(NullTransport),
        )
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = context(DeployConfig::default().with_chunk_size(0));
        assert!(matches!(result, Err(DeployError::Config(_))));
    }

    #[test]
    fn test_cleaner_respects_retain_snapshot() {
        let db = DatabaseName::new("orders").unwrap();
        let ctx = context(DeployConfig::for_testing("/srv/node")).unwrap();
        let expected = WorkspaceCleaner::new("/srv/node/exportDatabase/orders")
            .with_parent("/srv/node/exportDatabase");
        assert_eq!(format!("{:?}", ctx.cleaner(&db)), format!("{:?}", expected));

        let ctx =
            context(DeployConfig::for_testing("/srv/node").with_retain_snapshot(false)).unwrap();
        assert_eq!(
            format!("{:?}", ctx.cleaner(&db)),
            format!("{:?}", expected.with_snapshot("/srv/node/tempBackups/orders"))
        );
    }

    #[test]
    fn test_accessors() {
        let ctx = context(DeployConfig::for_testing("/srv/node")).unwrap();
        assert_eq!(ctx.local_node(), &NodeId::new("node-a"));
        assert_eq!(ctx.paths().root(), std::path::Path::new("/srv/node"));
        assert_eq!(ctx.config().chunk_size, 4096);
    }
}
