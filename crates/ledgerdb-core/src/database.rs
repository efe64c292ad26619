//! Ledger database handle.
//!
//! Opens the SQLite file, checks that this build can read it, and brings its
//! schema up to date.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::migration::{MigrationOrchestrator, MigrationOrchestratorBuilder};
use crate::storage::{SqliteExecutor, StorageConfig, StoredVersions, Transaction};
use crate::version::SchemaVersion;

/// An open ledger database.
pub struct LedgerDatabase {
    executor: SqliteExecutor,
    orchestrator: MigrationOrchestrator,
}

impl LedgerDatabase {
    /// Open a database with the built-in migrators.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let executor = SqliteExecutor::open(config)?;
        let orchestrator = MigrationOrchestrator::new(executor.clone());
        Ok(Self {
            executor,
            orchestrator,
        })
    }

    /// Open a database with a customised orchestrator.
    pub fn open_with(config: &StorageConfig, builder: MigrationOrchestratorBuilder) -> Result<Self> {
        let executor = SqliteExecutor::open(config)?;
        let orchestrator = builder.build(executor.clone())?;
        Ok(Self {
            executor,
            orchestrator,
        })
    }

    /// Get the executor.
    pub fn executor(&self) -> &SqliteExecutor {
        &self.executor
    }

    /// Get the orchestrator.
    pub fn orchestrator(&self) -> &MigrationOrchestrator {
        &self.orchestrator
    }

    /// Read the versions recorded in the database.
    pub fn stored_versions(&self) -> Result<StoredVersions> {
        Ok(self.executor.stored_versions()?)
    }

    /// Build the transaction [`initialize`](Self::initialize) would submit,
    /// without submitting it.
    pub fn plan(&self) -> Result<Option<Transaction>> {
        let stored = self.checked_versions()?;
        if self.is_ahead(&stored) {
            return Ok(None);
        }
        Ok(self.orchestrator.plan(stored.version))
    }

    /// Migrate the database to the target version.
    ///
    /// Returns the version recorded on disk afterwards, which is below the
    /// target if some step could not be produced.
    pub async fn initialize(&self) -> Result<SchemaVersion> {
        let stored = self.checked_versions()?;

        // A newer build's version record is left as it wrote it.
        if self.is_ahead(&stored) {
            warn!(
                version = stored.version,
                target = self.orchestrator.config().target_version,
                "database was written by a newer build, leaving it unmigrated"
            );
            return Ok(stored.version);
        }

        self.orchestrator.start(stored.version).await?;

        let version = self.executor.stored_versions()?.version;
        let target = self.orchestrator.config().target_version;
        if version < target {
            warn!(version, target, "database is below target version");
        } else {
            info!(version, "database ready");
        }
        Ok(version)
    }

    fn is_ahead(&self, stored: &StoredVersions) -> bool {
        stored.version > self.orchestrator.config().target_version
    }

    fn checked_versions(&self) -> Result<StoredVersions> {
        let stored = self.executor.stored_versions()?;
        let current = self.orchestrator.config().target_version;

        if stored.compatible_version > current {
            return Err(Error::IncompatibleDatabase {
                stored_compatible: stored.compatible_version,
                current,
            });
        }

        Ok(stored)
    }
}
