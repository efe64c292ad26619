//! Migration-specific error types.

use thiserror::Error;

use crate::storage::ExecutorError;
use crate::version::SchemaVersion;

/// Migration errors.
///
/// Step failures are not errors: they stop the version loop and the partial
/// transaction is still submitted. Only the executor's verdict reaches the
/// caller of [`MigrationOrchestrator::start`](super::MigrationOrchestrator::start).
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The executor failed to apply the transaction.
    #[error("executor failed: {0}")]
    Executor(#[from] ExecutorError),

    /// Orchestrator configuration is inconsistent.
    #[error("invalid migration config: compatible version {compatible_version} exceeds target version {target_version}")]
    InvalidConfig {
        /// Configured target version.
        target_version: SchemaVersion,
        /// Configured compatible version.
        compatible_version: SchemaVersion,
    },
}
