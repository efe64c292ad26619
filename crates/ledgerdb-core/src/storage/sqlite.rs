//! SQLite executor.
//!
//! Applies a [`Transaction`] inside one SQLite transaction on a blocking
//! worker thread. The `Migrate` marker writes the transaction's versions to
//! the meta table as part of the same commit.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, trace};

use super::config::StorageConfig;
use super::executor::{Executor, ExecutorError};
use super::meta::{MetaTable, StoredVersions};
use super::transaction::Transaction;

/// Executor backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Open the database described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, ExecutorError> {
        let conn = match config.path() {
            Some(path) => {
                let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX;
                if config.create_if_missing {
                    flags |= OpenFlags::SQLITE_OPEN_CREATE;
                }
                Connection::open_with_flags(path, flags)?
            }
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout)?;

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Read the versions recorded in the meta table.
    pub fn stored_versions(&self) -> Result<StoredVersions, ExecutorError> {
        let conn = self.conn.lock();
        Ok(MetaTable::read(&conn)?)
    }

    /// Run `f` with exclusive access to the connection.
    ///
    /// Must not be called from inside an executing transaction.
    pub fn with_connection<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Connection) -> R,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    fn apply(conn: &mut Connection, transaction: &Transaction) -> rusqlite::Result<()> {
        let tx = conn.transaction()?;

        for command in transaction.commands() {
            match command.to_sql() {
                Some(sql) => {
                    trace!(kind = %command.kind(), sql = %sql, "applying command");
                    tx.execute_batch(&sql)?;
                }
                None => {
                    MetaTable::write(
                        &tx,
                        StoredVersions {
                            version: transaction.version,
                            compatible_version: transaction.compatible_version,
                        },
                    )?;
                }
            }
        }

        tx.commit()
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(&self, transaction: Transaction) -> Result<(), ExecutorError> {
        let conn = Arc::clone(&self.conn);
        let command_count = transaction.len();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            Self::apply(&mut conn, &transaction)
        })
        .await
        .map_err(|e| ExecutorError::Aborted(e.to_string()))??;

        debug!(command_count, "transaction committed");
        Ok(())
    }
}
