//! LedgerDB Core - versioned schema migrations for the ledger database.
//!
//! This crate brings an embedded SQLite ledger database from the schema
//! version it was last written with up to the version compiled into this
//! build, as one atomic transaction.

pub mod database;
pub mod error;
pub mod migration;
pub mod storage;
pub mod version;

pub use database::LedgerDatabase;
pub use error::{Error, Result};
pub use migration::{
    EntityMigrator, MigrationConfig, MigrationError, MigrationEvent, MigrationLog,
    MigrationOrchestrator, TracingLog,
};
pub use storage::{
    Command, CommandKind, Executor, ExecutorError, SqliteExecutor, StorageConfig, StoredVersions,
    Transaction,
};
pub use version::{
    compatible_version, current_schema_version, SchemaVersion, COMPATIBLE_VERSION,
    CURRENT_SCHEMA_VERSION,
};
