//! Storage layer: the command buffer and the executors that apply it.

pub mod command;
pub mod config;
pub mod executor;
pub mod meta;
pub mod sqlite;
pub mod transaction;

pub use command::{ColumnDef, ColumnType, Command, CommandKind, TableDef};
pub use config::StorageConfig;
pub use executor::{Executor, ExecutorError};
pub use meta::{CorruptMetaValue, MetaTable, StoredVersions};
pub use sqlite::SqliteExecutor;
pub use transaction::Transaction;
