//! Executor seam: applies a finalized transaction atomically.

use async_trait::async_trait;
use thiserror::Error;

use super::transaction::Transaction;

/// Errors reported by an executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// SQLite rejected a statement or the commit.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The executor refused the transaction before applying anything.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The worker applying the transaction did not finish.
    #[error("execution aborted: {0}")]
    Aborted(String),
}

/// Applies transactions against physical storage.
///
/// `execute` takes ownership of the transaction and resolves exactly once.
/// Either every command is applied or none is.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Apply all commands of `transaction` atomically.
    async fn execute(&self, transaction: Transaction) -> Result<(), ExecutorError>;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for std::sync::Arc<E> {
    async fn execute(&self, transaction: Transaction) -> Result<(), ExecutorError> {
        (**self).execute(transaction).await
    }
}
