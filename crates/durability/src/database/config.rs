//! Deploy configuration via `deploy.toml`
//!
//! Every value has a default matching the wire protocol's fixed constants, so
//! an empty file (or no file at all) yields a working configuration. Values
//! are fixed for the lifetime of a node: nothing here is negotiated with the
//! peer.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::paths::DeployPaths;

/// Config file name placed in the working root.
pub const CONFIG_FILE_NAME: &str = "deploy.toml";

/// Default directory for snapshot files.
pub const DEFAULT_BACKUP_DIR: &str = "tempBackups";

/// Default exporter scratch directory.
pub const DEFAULT_EXPORT_DIR: &str = "exportDatabase";

/// Default chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1_048_576;

/// What the sender does after a negative acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NackPolicy {
    /// Keep the unacknowledged bytes, append the next chunk, resend both
    ///
    /// Each resend is a prefix extension of the previous one. This is the
    /// behaviour existing receivers expect.
    #[default]
    Accumulate,
    /// Resend exactly the unacknowledged bytes, reading nothing new until acked
    RetrySameChunk,
}

/// Deploy configuration loaded from `deploy.toml`.
///
/// # Example
///
/// ```toml
/// working_root = "/var/lib/strata"
/// chunk_size = 1048576
/// nack_policy = "accumulate"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Directory under which snapshot and scratch directories live.
    #[serde(default = "default_working_root")]
    pub working_root: PathBuf,
    /// Snapshot directory name under the working root.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    /// Exporter scratch directory name under the working root.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    /// Maximum bytes read from the snapshot per send.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Behaviour after a negative acknowledgment.
    #[serde(default)]
    pub nack_policy: NackPolicy,
    /// Give up after this many negative acks in a row (unbounded if absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_nacks: Option<u32>,
    /// Keep the snapshot file after the attempt.
    #[serde(default = "default_retain_snapshot")]
    pub retain_snapshot: bool,
}

fn default_working_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}

fn default_export_dir() -> String {
    DEFAULT_EXPORT_DIR.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_retain_snapshot() -> bool {
    true
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            working_root: default_working_root(),
            backup_dir: default_backup_dir(),
            export_dir: default_export_dir(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            nack_policy: NackPolicy::default(),
            max_consecutive_nacks: None,
            retain_snapshot: default_retain_snapshot(),
        }
    }
}

impl DeployConfig {
    /// Create config for testing
    ///
    /// Uses a small chunk size so multi-chunk transfers stay cheap.
    pub fn for_testing(working_root: impl Into<PathBuf>) -> Self {
        DeployConfig {
            working_root: working_root.into(),
            chunk_size: 4096,
            ..Default::default()
        }
    }

    /// Set the working root
    pub fn with_working_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_root = root.into();
        self
    }

    /// Set the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the negative-ack policy
    pub fn with_nack_policy(mut self, policy: NackPolicy) -> Self {
        self.nack_policy = policy;
        self
    }

    /// Bound the number of consecutive negative acks
    pub fn with_max_consecutive_nacks(mut self, max: u32) -> Self {
        self.max_consecutive_nacks = Some(max);
        self
    }

    /// Keep or remove the snapshot file after each attempt
    pub fn with_retain_snapshot(mut self, retain: bool) -> Self {
        self.retain_snapshot = retain;
        self
    }

    /// Paths derived from this config
    pub fn paths(&self) -> DeployPaths {
        DeployPaths::from_root(&self.working_root)
            .with_dir_names(self.backup_dir.clone(), self.export_dir.clone())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        validate_dir_name("backup_dir", &self.backup_dir)?;
        validate_dir_name("export_dir", &self.export_dir)?;
        if self.backup_dir == self.export_dir {
            // Cleanup would delete the snapshots
            return Err(ConfigError::SharedDirectory(self.backup_dir.clone()));
        }
        if self.max_consecutive_nacks == Some(0) {
            return Err(ConfigError::InvalidNackLimit);
        }
        Ok(())
    }

    /// Parse config from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeployConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata deploy configuration
#
# Directory under which snapshots and exporter scratch space live.
working_root = "."

# Snapshot files are written to {working_root}/{backup_dir}/{database}.
backup_dir = "tempBackups"

# Exporter scratch space, removed after every deploy attempt.
export_dir = "exportDatabase"

# Bytes read from the snapshot per send (default 1 MiB).
# Must match what receivers expect; it is not negotiated.
chunk_size = 1048576

# After a negative acknowledgment:
#   "accumulate"       = keep the refused bytes, append the next chunk, resend both
#   "retry_same_chunk" = resend only the refused bytes
nack_policy = "accumulate"

# Fail the attempt after this many refusals in a row (unbounded if unset).
# max_consecutive_nacks = 16

# Keep the snapshot file after the attempt (it is overwritten by the next one).
retain_snapshot = true
"#
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

fn validate_dir_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidDirName {
            field,
            value: value.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Chunk size must be positive
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// Directory name is not a single relative path component
    #[error("Invalid {field}: '{value}' must be a single directory name")]
    InvalidDirName {
        /// Config field
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// Snapshots and scratch space must not share a directory
    #[error("backup_dir and export_dir are both '{0}'")]
    SharedDirectory(String),

    /// A zero nack limit would fail every transfer
    #[error("max_consecutive_nacks must be at least 1")]
    InvalidNackLimit,

    /// Config file could not be read
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config file could not be written
    #[error("Failed to write config file '{}': {source}", path.display())]
    Write {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(String),
}
