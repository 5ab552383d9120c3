//! Deploy task
//!
//! A node that needs a database sends `DeployDatabaseTask` to a node that
//! has it. Executing the task composes the whole protocol:
//!
//! ```text
//! try_lock(database)                      -- held elsewhere: Skipped
//!   CleanupGuard                          -- drops before the lock
//!     freeze / export / release           -- SnapshotProducer
//!     chunked send to the source node     -- ChunkSender
//! -> Deployed
//! ```
//!
//! Errors from the export or the transfer propagate to the caller after the
//! workspace has been cleaned and the lock released. Retrying a failed or
//! skipped deploy is up to the requesting node.

use crate::context::DeployContext;
use crate::transfer::{ChunkSender, TransferStats};
use strata_concurrency::LockOutcome;
use strata_core::{
    CommandError, CommandHeader, DatabaseName, DeployError, DeployOutcome, DeployResult, NodeId,
    ReplicatedCommand, SnapshotSource, TaskId,
};
use tracing::{debug, info, warn};

/// Request to deploy a database to the requesting node
///
/// Carries no payload: the header names the database and the node to send
/// it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployDatabaseTask {
    header: CommandHeader,
}

impl DeployDatabaseTask {
    /// Create a task asking for `database` on behalf of `source_node`
    pub fn new(database: DatabaseName, source_node: NodeId) -> Self {
        DeployDatabaseTask {
            header: CommandHeader::new(database, source_node),
        }
    }

    /// Create a task from an unchecked database name
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidDatabaseName` if `database` is not a
    /// valid database name.
    pub fn try_new(database: &str, source_node: NodeId) -> DeployResult<Self> {
        Ok(Self::new(DatabaseName::new(database)?, source_node))
    }

    /// Task identity
    pub fn id(&self) -> TaskId {
        self.header.id
    }

    /// Database to deploy
    pub fn database(&self) -> &DatabaseName {
        &self.header.database
    }

    /// Node that asked for the database and receives the chunks
    pub fn source_node(&self) -> &NodeId {
        &self.header.source_node
    }

    /// Run the deploy protocol against the open database `source`
    ///
    /// Returns `Skipped` if another attempt for the same database holds the
    /// deploy lock, `Deployed` once every chunk has been acknowledged.
    pub fn execute(
        &self,
        ctx: &DeployContext,
        source: &dyn SnapshotSource,
    ) -> DeployResult<DeployOutcome> {
        let database = self.database();
        if source.name() != database.as_str() {
            return Err(DeployError::DatabaseMismatch {
                expected: database.clone(),
                actual: source.name().to_string(),
            });
        }

        match ctx.locks().try_run(database, || self.deploy(ctx, source))? {
            LockOutcome::Ran(stats) => {
                info!(
                    target: "strata::deploy",
                    task = %self.id(),
                    database = %database,
                    destination = %self.source_node(),
                    chunks = stats.chunks_sent,
                    nacks = stats.nacks,
                    bytes = stats.bytes_read,
                    "Database deployed"
                );
                Ok(DeployOutcome::Deployed)
            }
            LockOutcome::Skipped => {
                debug!(
                    target: "strata::deploy",
                    task = %self.id(),
                    database = %database,
                    requested_by = %self.source_node(),
                    "Skip deploying database because another node is doing it"
                );
                Ok(DeployOutcome::Skipped)
            }
        }
    }

    fn deploy(
        &self,
        ctx: &DeployContext,
        source: &dyn SnapshotSource,
    ) -> DeployResult<TransferStats> {
        let database = self.database();
        warn!(
            target: "strata::deploy",
            task = %self.id(),
            database = %database,
            requested_by = %self.source_node(),
            "Backing up database"
        );

        let _cleanup = ctx.cleaner(database).guard();

        let snapshot = ctx.producer().produce(database, source)?;
        let stats = ChunkSender::new(ctx.transport(), database, ctx.local_node(), ctx.config())
            .send(&snapshot, self.source_node())?;
        Ok(stats)
    }
}

impl ReplicatedCommand for DeployDatabaseTask {
    const NAME: &'static str = "deploy_db";

    fn header(&self) -> &CommandHeader {
        &self.header
    }

    fn payload(&self) -> Option<&[u8]> {
        None
    }

    fn from_parts(header: CommandHeader, payload: Option<Vec<u8>>) -> Result<Self, CommandError> {
        if payload.is_some() {
            return Err(CommandError::UnexpectedPayload(Self::NAME));
        }
        Ok(DeployDatabaseTask { header })
    }
}
