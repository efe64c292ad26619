//! Core error types.

use thiserror::Error;

use crate::migration::MigrationError;
use crate::storage::ExecutorError;
use crate::version::SchemaVersion;

/// Ledger database errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] ExecutorError),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),

    /// The database was written by a newer build that older code cannot read.
    #[error("database requires schema version {stored_compatible} or newer, this build supports up to {current}")]
    IncompatibleDatabase {
        /// Compatible version recorded in the database.
        stored_compatible: SchemaVersion,
        /// Newest version this build supports.
        current: SchemaVersion,
    },
}

/// Result alias for ledger database operations.
pub type Result<T> = std::result::Result<T, Error>;
