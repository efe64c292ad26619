//! Schema migration engine for the ledger database.
//!
//! A database records the schema version it was last migrated to. On open,
//! the [`MigrationOrchestrator`] walks every version between that and the
//! compiled-in target, asks each [`EntityMigrator`] for its commands, and
//! submits the result to an [`Executor`](crate::storage::Executor) as one
//! atomic [`Transaction`](crate::storage::Transaction).
//!
//! # Partial progress
//!
//! If a migrator cannot produce a step, the walk stops there and the steps
//! already collected are still committed. The database ends up at the highest
//! version every migrator could reach instead of staying where it was.
//!
//! # Example
//!
//! ```ignore
//! use ledgerdb_core::migration::MigrationOrchestrator;
//! use ledgerdb_core::storage::{SqliteExecutor, StorageConfig};
//!
//! let executor = SqliteExecutor::open(&StorageConfig::new("ledger.db"))?;
//! let stored = executor.stored_versions()?;
//!
//! let orchestrator = MigrationOrchestrator::new(executor);
//! orchestrator.start(stored.version).await?;
//! ```

pub mod entities;
pub mod error;
pub mod log;
pub mod migrator;
pub mod orchestrator;
pub mod table;

pub use entities::{default_migrators, ActivityInfoMigrator, PublisherInfoMigrator};
pub use error::MigrationError;
pub use log::{MigrationEvent, MigrationLog, TracingLog};
pub use migrator::EntityMigrator;
pub use orchestrator::{MigrationConfig, MigrationOrchestrator, MigrationOrchestratorBuilder};
