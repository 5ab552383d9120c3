//! Deploy working directories and configuration

pub mod config;
pub mod paths;

pub use config::{
    ConfigError, DeployConfig, NackPolicy, CONFIG_FILE_NAME, DEFAULT_BACKUP_DIR,
    DEFAULT_CHUNK_SIZE, DEFAULT_EXPORT_DIR,
};
pub use paths::DeployPaths;
