//! Storage configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time SQLite waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for opening the ledger database.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the database file. None opens a private in-memory database.
    pub path: Option<PathBuf>,

    /// How long to wait on a locked database.
    pub busy_timeout: Duration,

    /// Create the file if it does not exist.
    pub create_if_missing: bool,
}

impl StorageConfig {
    /// Create a configuration for a database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            create_if_missing: true,
        }
    }

    /// Create a configuration for an in-memory database.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            create_if_missing: true,
        }
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Refuse to create a missing database file.
    pub fn existing_only(mut self) -> Self {
        self.create_if_missing = false;
        self
    }

    /// Get the database path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if this configuration opens an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new("./ledger.db")
    }
}
