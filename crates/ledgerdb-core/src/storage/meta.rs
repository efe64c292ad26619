//! Persisted schema version record.
//!
//! A small key/value table holding the version the database was last migrated
//! to and the oldest reader version that can still use it.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::version::SchemaVersion;

/// Table name.
pub const META_TABLE: &str = "meta";

/// Key of the stored schema version.
pub const VERSION_KEY: &str = "version";

/// Key of the stored compatible version.
pub const COMPATIBLE_VERSION_KEY: &str = "last_compatible_version";

/// Versions read from the meta table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredVersions {
    /// Version the database was last migrated to. 0 for a fresh database.
    pub version: SchemaVersion,
    /// Compatible version written with it. 0 for a fresh database.
    pub compatible_version: SchemaVersion,
}

/// A meta value that is not a version number.
///
/// Surfaces as [`rusqlite::Error::FromSqlConversionFailure`] from
/// [`MetaTable::read`].
#[derive(Debug, Error)]
#[error("meta key `{key}` holds `{value}`, expected a schema version")]
pub struct CorruptMetaValue {
    /// Key that was read.
    pub key: String,
    /// Stored text.
    pub value: String,
}

/// Accessor for the meta table.
pub struct MetaTable;

impl MetaTable {
    /// Create the meta table if missing.
    pub fn ensure(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (key TEXT NOT NULL PRIMARY KEY, value TEXT)",
            META_TABLE
        ))
    }

    /// Check whether the meta table exists.
    pub fn exists(conn: &Connection) -> rusqlite::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![META_TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Read both versions. A missing table or key reads as 0; a value that
    /// is not a version number is an error.
    pub fn read(conn: &Connection) -> rusqlite::Result<StoredVersions> {
        if !Self::exists(conn)? {
            return Ok(StoredVersions::default());
        }

        Ok(StoredVersions {
            version: Self::get(conn, VERSION_KEY)?.unwrap_or(0),
            compatible_version: Self::get(conn, COMPATIBLE_VERSION_KEY)?.unwrap_or(0),
        })
    }

    /// Write both versions.
    pub fn write(conn: &Connection, versions: StoredVersions) -> rusqlite::Result<()> {
        Self::ensure(conn)?;
        Self::set(conn, VERSION_KEY, versions.version)?;
        Self::set(conn, COMPATIBLE_VERSION_KEY, versions.compatible_version)?;
        Ok(())
    }

    fn get(conn: &Connection, key: &str) -> rusqlite::Result<Option<SchemaVersion>> {
        let value: Option<String> = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", META_TABLE),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|v| {
                v.parse().map_err(|_| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        Type::Text,
                        Box::new(CorruptMetaValue {
                            key: key.to_string(),
                            value: v.clone(),
                        }),
                    )
                })
            })
            .transpose()
    }

    fn set(conn: &Connection, key: &str, value: SchemaVersion) -> rusqlite::Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                META_TABLE
            ),
            params![key, value.to_string()],
        )?;
        Ok(())
    }
}
