//! Migrations for the `publisher_info` table.

use crate::migration::migrator::EntityMigrator;
use crate::migration::table::{add_column, rebuild_table};
use crate::storage::{ColumnDef, ColumnType, Command, TableDef, Transaction};
use crate::version::SchemaVersion;

/// Table name.
pub const TABLE_NAME: &str = "publisher_info";

/// Publisher has not registered.
pub const STATUS_NOT_VERIFIED: i64 = 0;
/// Publisher registered but has not verified a wallet.
pub const STATUS_CONNECTED: i64 = 1;
/// Publisher is verified.
pub const STATUS_VERIFIED: i64 = 2;

/// Migrator for `publisher_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublisherInfoMigrator;

impl PublisherInfoMigrator {
    /// Create the migrator.
    pub fn new() -> Self {
        Self
    }

    fn table_v1() -> TableDef {
        TableDef::new(TABLE_NAME)
            .with_column(ColumnDef::new("publisher_id", ColumnType::Text))
            .with_column(ColumnDef::new("verified", ColumnType::Boolean).with_default("0"))
            .with_column(ColumnDef::new("excluded", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("name", ColumnType::Text))
            .with_column(ColumnDef::new("favicon", ColumnType::Text))
            .with_column(ColumnDef::new("url", ColumnType::Text))
            .with_column(ColumnDef::new("provider", ColumnType::Text))
            .with_primary_key(["publisher_id"])
    }

    fn status_column() -> ColumnDef {
        ColumnDef::new("status", ColumnType::Integer).with_default(STATUS_NOT_VERIFIED.to_string())
    }

    /// Layout from version 4 on: `verified` is folded into `status`.
    fn table_v4() -> TableDef {
        TableDef::new(TABLE_NAME)
            .with_column(ColumnDef::new("publisher_id", ColumnType::Text))
            .with_column(Self::status_column())
            .with_column(ColumnDef::new("excluded", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("name", ColumnType::Text))
            .with_column(ColumnDef::new("favicon", ColumnType::Text))
            .with_column(ColumnDef::new("url", ColumnType::Text))
            .with_column(ColumnDef::new("provider", ColumnType::Text))
            .with_primary_key(["publisher_id"])
    }

    fn migrate_to_v1(&self, transaction: &mut Transaction) -> bool {
        transaction.push(Command::create_table(Self::table_v1()));
        true
    }

    fn migrate_to_v3(&self, transaction: &mut Transaction) -> bool {
        match add_column(TABLE_NAME, Self::status_column()) {
            Some(command) => {
                transaction.push(command);
                true
            }
            None => false,
        }
    }

    fn migrate_to_v4(&self, transaction: &mut Transaction) -> bool {
        let status = format!(
            "CASE WHEN verified = 1 AND status = {} THEN {} ELSE status END",
            STATUS_NOT_VERIFIED, STATUS_VERIFIED
        );
        let columns = [
            ("publisher_id", "publisher_id"),
            (status.as_str(), "status"),
            ("excluded", "excluded"),
            ("name", "name"),
            ("favicon", "favicon"),
            ("url", "url"),
            ("provider", "provider"),
        ];

        match rebuild_table(&Self::table_v4(), &columns) {
            Some(commands) => {
                transaction.extend(commands);
                true
            }
            None => false,
        }
    }

    fn migrate_to_v5(&self, transaction: &mut Transaction) -> bool {
        let updated_at = ColumnDef::new("updated_at", ColumnType::Integer).with_default("0");
        match add_column(TABLE_NAME, updated_at) {
            Some(command) => {
                transaction.push(command);
                true
            }
            None => false,
        }
    }
}

impl EntityMigrator for PublisherInfoMigrator {
    fn name(&self) -> &str {
        TABLE_NAME
    }

    fn migrate_to(&self, transaction: &mut Transaction, target: SchemaVersion) -> bool {
        match target {
            1 => self.migrate_to_v1(transaction),
            3 => self.migrate_to_v3(transaction),
            4 => self.migrate_to_v4(transaction),
            5 => self.migrate_to_v5(transaction),
            2 => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CommandKind;
    use crate::version::CURRENT_SCHEMA_VERSION;
    use rusqlite::Connection;

    fn migrate(conn: &Connection, versions: std::ops::RangeInclusive<SchemaVersion>) {
        let migrator = PublisherInfoMigrator::new();
        for version in versions {
            let mut tx = Transaction::new();
            assert!(migrator.migrate_to(&mut tx, version), "v{}", version);
            for command in tx.commands() {
                conn.execute_batch(&command.to_sql().unwrap()).unwrap();
            }
        }
    }

    #[test]
    fn test_each_version_step() {
        let migrator = PublisherInfoMigrator::new();
        let expected: [(SchemaVersion, &[CommandKind]); 5] = [
            (1, &[CommandKind::CreateTable]),
            (2, &[]),
            (3, &[CommandKind::AddColumn]),
            (
                4,
                &[
                    CommandKind::RenameTable,
                    CommandKind::CreateTable,
                    CommandKind::CopyTable,
                    CommandKind::DropTable,
                ],
            ),
            (5, &[CommandKind::AddColumn]),
        ];

        for (version, kinds) in expected {
            let mut tx = Transaction::new();
            assert!(migrator.migrate_to(&mut tx, version));
            let actual: Vec<CommandKind> = tx.commands().iter().map(Command::kind).collect();
            assert_eq!(actual, kinds, "v{}", version);
        }
    }

    #[test]
    fn test_unknown_versions_append_nothing() {
        let migrator = PublisherInfoMigrator::new();
        let mut tx = Transaction::new();

        assert!(!migrator.migrate_to(&mut tx, 0));
        assert!(!migrator.migrate_to(&mut tx, CURRENT_SCHEMA_VERSION + 1));
        assert!(tx.is_empty());
    }

    #[test]
    fn test_verified_folds_into_status() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn, 1..=3);

        conn.execute_batch(
            "INSERT INTO publisher_info (publisher_id, verified, name, favicon, url, provider) \
             VALUES ('a.com', 1, 'A', '', 'https://a.com', ''); \
             INSERT INTO publisher_info (publisher_id, verified, name, favicon, url, provider, status) \
             VALUES ('b.com', 0, 'B', '', 'https://b.com', '', 1); \
             INSERT INTO publisher_info (publisher_id, verified, name, favicon, url, provider) \
             VALUES ('c.com', 0, 'C', '', 'https://c.com', '');",
        )
        .unwrap();

        migrate(&conn, 4..=CURRENT_SCHEMA_VERSION);

        let status = |id: &str| -> i64 {
            conn.query_row(
                "SELECT status FROM publisher_info WHERE publisher_id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert_eq!(status("a.com"), STATUS_VERIFIED);
        assert_eq!(status("b.com"), STATUS_CONNECTED);
        assert_eq!(status("c.com"), STATUS_NOT_VERIFIED);

        let updated_at: i64 = conn
            .query_row(
                "SELECT updated_at FROM publisher_info WHERE publisher_id = 'a.com'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(updated_at, 0);
    }
}
