use std::sync::Arc;
use strata_deploy::*;
use tempfile::TempDir;

struct AckAll;

impl ChunkTransport for AckAll {
    fn apply_chunk(&self, _: &NodeId, _: &CopyDatabaseChunk) -> Result<bool, TransportError> {
        Ok(true)
    }
}

#[test]
fn default_config_file_builds_context() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    DeployConfig::write_default_if_missing(&path).unwrap();
    let config = DeployConfig::from_file(&path).unwrap();
    assert_eq!(config, DeployConfig::default());

    let ctx = DeployContext::new(
        config.with_working_root(dir.path()),
        NodeId::new("node-a"),
        Arc::new(LocalLockTable::new()),
        Arc::new(AckAll),
    )
    .unwrap();
    assert_eq!(ctx.paths().backup_dir(), dir.path().join("tempBackups"));
}

#[test]
fn existing_config_file_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "chunk_size = 512\nnack_policy = \"retry_same_chunk\"\n").unwrap();

    DeployConfig::write_default_if_missing(&path).unwrap();
    let config = DeployConfig::from_file(&path).unwrap();

    assert_eq!(config.chunk_size, 512);
    assert_eq!(config.nack_policy, NackPolicy::RetrySameChunk);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "backup_dir = \"../escape\"\n").unwrap();

    assert!(matches!(
        DeployConfig::from_file(&path),
        Err(ConfigError::InvalidDirName { field: "backup_dir", .. })
    ));
}
