use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use strata_deploy::*;
use tempfile::TempDir;

/// Database exported by copying a file
struct FileDatabase {
    name: String,
    data: PathBuf,
}

impl SnapshotSource for FileDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn freeze(&self) -> Result<(), SnapshotError> {
        Ok(())
    }

    fn release(&self) {}

    fn export(&self, request: &ExportRequest<'_>) -> Result<(), SnapshotError> {
        std::fs::copy(&self.data, request.target)?;
        Ok(())
    }
}

/// Receiving node: decodes envelopes and appends payloads to `target`
struct Receiver {
    node: NodeId,
    target: PathBuf,
    refuse_first: Mutex<bool>,
}

impl ChunkTransport for Receiver {
    fn apply_chunk(
        &self,
        destination: &NodeId,
        chunk: &CopyDatabaseChunk,
    ) -> Result<bool, TransportError> {
        if destination != &self.node {
            return Err(TransportError::Unreachable(destination.to_string()));
        }
        let wire = chunk
            .to_envelope()
            .to_bytes()
            .map_err(|e| TransportError::Remote(e.to_string()))?;
        let envelope =
            CommandEnvelope::from_bytes(&wire).map_err(|e| TransportError::Remote(e.to_string()))?;
        let chunk = CopyDatabaseChunk::from_envelope(envelope)
            .map_err(|e| TransportError::Remote(e.to_string()))?;

        let mut refuse = self.refuse_first.lock();
        if *refuse {
            *refuse = false;
            return Ok(false);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.target)
            .map_err(|e| TransportError::Remote(e.to_string()))?;
        file.write_all(chunk.bytes())
            .map_err(|e| TransportError::Remote(e.to_string()))?;
        Ok(true)
    }
}

fn setup(refuse_first: bool) -> (TempDir, FileDatabase, Arc<Receiver>, DeployContext) {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("orders.db");
    let bytes: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 256) as u8).collect();
    std::fs::write(&data, bytes).unwrap();

    let receiver = Arc::new(Receiver {
        node: NodeId::new("node-b"),
        target: dir.path().join("received.db"),
        refuse_first: Mutex::new(refuse_first),
    });
    let ctx = DeployContext::new(
        DeployConfig::for_testing(dir.path().join("node-a")),
        NodeId::new("node-a"),
        Arc::new(LocalLockTable::new()),
        receiver.clone(),
    )
    .unwrap();
    let database = FileDatabase {
        name: "orders".to_string(),
        data,
    };
    (dir, database, receiver, ctx)
}

#[test]
fn deploy_reproduces_database_on_receiver() {
    let (_dir, database, receiver, ctx) = setup(false);
    let task = DeployDatabaseTask::try_new("orders", NodeId::new("node-b")).unwrap();

    let outcome = task.execute(&ctx, &database).unwrap();

    assert_eq!(outcome, DeployOutcome::Deployed);
    assert_eq!(
        std::fs::read(&receiver.target).unwrap(),
        std::fs::read(&database.data).unwrap()
    );
}

#[test]
fn refused_first_chunk_is_resent_with_the_next() {
    let (_dir, database, receiver, ctx) = setup(true);
    let task = DeployDatabaseTask::try_new("orders", NodeId::new("node-b")).unwrap();

    task.execute(&ctx, &database).unwrap();

    assert_eq!(
        std::fs::read(&receiver.target).unwrap(),
        std::fs::read(&database.data).unwrap()
    );
}

#[test]
fn unknown_destination_fails_and_releases_lock() {
    let (_dir, database, _receiver, ctx) = setup(false);
    let task = DeployDatabaseTask::try_new("orders", NodeId::new("node-c")).unwrap();

    let err = task.execute(&ctx, &database).unwrap_err();
    assert!(matches!(
        err,
        DeployError::Transfer(TransferError::Transport { chunk: 0, .. })
    ));
    assert!(!ctx.paths().export_root().exists());

    // Next attempt is not skipped
    let retry = DeployDatabaseTask::try_new("orders", NodeId::new("node-b")).unwrap();
    assert_eq!(retry.execute(&ctx, &database).unwrap(), DeployOutcome::Deployed);
}

#[test]
fn task_travels_as_envelope() {
    let task = DeployDatabaseTask::try_new("orders", NodeId::new("node-b")).unwrap();
    let wire = task.to_envelope().to_bytes().unwrap();

    let envelope = CommandEnvelope::from_bytes(&wire).unwrap();
    assert_eq!(envelope.name, "deploy_db");
    assert!(matches!(
        CopyDatabaseChunk::from_envelope(envelope.clone()),
        Err(CommandError::UnexpectedCommand { .. })
    ));
    assert_eq!(DeployDatabaseTask::from_envelope(envelope).unwrap(), task);
}
