//! Identity types for deploy attempts
//!
//! - DatabaseName: validated name of the database being deployed
//! - NodeId: opaque cluster node identifier
//! - TaskId: unique identity of one replicated command instance
//! - DeployOutcome: terminal result of a deploy attempt
//!
//! ## Database name validation
//!
//! The database name is joined into the backup path on disk, so it must be a
//! single safe path component:
//! - Be 1-256 characters
//! - Contain only alphanumeric, dash, underscore, dot
//! - Not start with a dash or dot

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a database name
pub const MAX_DATABASE_NAME_LENGTH: usize = 256;

/// Name of a database that can be deployed to a peer
///
/// Deploy locks, snapshot file names, and command headers are all keyed by
/// this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

/// Error when validating a database name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseNameError {
    /// Name is empty
    Empty,
    /// Name exceeds maximum length
    TooLong {
        /// Actual length of the name
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Name contains invalid character
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
    /// Name starts with invalid character
    InvalidStart {
        /// The invalid starting character
        char: char,
    },
}

impl fmt::Display for DatabaseNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseNameError::Empty => write!(f, "database name cannot be empty"),
            DatabaseNameError::TooLong { length, max } => {
                write!(f, "database name too long: {} chars (max {})", length, max)
            }
            DatabaseNameError::InvalidChar { char, position } => write!(
                f,
                "invalid character '{}' at position {} (allowed: alphanumeric, '-', '_', '.')",
                char, position
            ),
            DatabaseNameError::InvalidStart { char } => {
                write!(f, "database name cannot start with '{}'", char)
            }
        }
    }
}

impl std::error::Error for DatabaseNameError {}

impl DatabaseName {
    /// Create a new DatabaseName, validating the input
    ///
    /// # Errors
    ///
    /// Returns `DatabaseNameError` if the name is not a safe path component.
    pub fn new(name: impl Into<String>) -> Result<Self, DatabaseNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(DatabaseName(name))
    }

    /// Validate a database name
    pub fn validate(name: &str) -> Result<(), DatabaseNameError> {
        if name.is_empty() {
            return Err(DatabaseNameError::Empty);
        }

        if name.len() > MAX_DATABASE_NAME_LENGTH {
            return Err(DatabaseNameError::TooLong {
                length: name.len(),
                max: MAX_DATABASE_NAME_LENGTH,
            });
        }

        for (position, c) in name.chars().enumerate() {
            if !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
                return Err(DatabaseNameError::InvalidChar { char: c, position });
            }
        }

        // Rules out "." and ".." as well as hidden files
        if let Some(first) = name.chars().next() {
            if first == '-' || first == '.' {
                return Err(DatabaseNameError::InvalidStart { char: first });
            }
        }

        Ok(())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = DatabaseNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DatabaseName::new(value)
    }
}

impl TryFrom<&str> for DatabaseName {
    type Error = DatabaseNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        DatabaseName::new(value)
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.0
    }
}

/// Identifier of a node in the cluster
///
/// Opaque to this crate: membership and addressing belong to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::new(id)
    }
}

/// Unique identity of one replicated command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a new random task id
    pub fn new() -> Self {
        TaskId(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal result of a deploy attempt
///
/// Failures are not outcomes: they surface as `Err(DeployError)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployOutcome {
    /// The snapshot was exported and every chunk was acknowledged
    Deployed,
    /// Another attempt holds the deploy lock for this database
    Skipped,
}

impl DeployOutcome {
    /// Wire sentinel returned to the requesting node
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployOutcome::Deployed => "deployed",
            DeployOutcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
