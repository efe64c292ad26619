//! Migrations for the `activity_info` table.
//!
//! One row per publisher visit aggregate within a reconcile period.

use crate::migration::migrator::EntityMigrator;
use crate::migration::table::rebuild_table_grouped;
use crate::storage::{ColumnDef, ColumnType, Command, TableDef, Transaction};
use crate::version::SchemaVersion;

/// Table name.
pub const TABLE_NAME: &str = "activity_info";

const PUBLISHER_ID_INDEX: &str = "activity_info_publisher_id_index";
const RECONCILE_STAMP_INDEX: &str = "activity_info_reconcile_stamp_index";

/// Migrator for `activity_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityInfoMigrator;

impl ActivityInfoMigrator {
    /// Create the migrator.
    pub fn new() -> Self {
        Self
    }

    fn table_v1() -> TableDef {
        TableDef::new(TABLE_NAME)
            .with_column(ColumnDef::new("publisher_id", ColumnType::Text))
            .with_column(ColumnDef::new("duration", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("score", ColumnType::Double).with_default("0"))
            .with_column(ColumnDef::new("percent", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("weight", ColumnType::Double).with_default("0"))
            .with_column(ColumnDef::new("month", ColumnType::Integer))
            .with_column(ColumnDef::new("year", ColumnType::Integer))
            .with_column(ColumnDef::new("reconcile_stamp", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("visits", ColumnType::Integer).with_default("0"))
    }

    /// Layout from version 4 on: the reconcile stamp replaces month/year.
    fn table_v4() -> TableDef {
        TableDef::new(TABLE_NAME)
            .with_column(ColumnDef::new("publisher_id", ColumnType::Text))
            .with_column(ColumnDef::new("duration", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("visits", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("score", ColumnType::Double).with_default("0"))
            .with_column(ColumnDef::new("percent", ColumnType::Integer).with_default("0"))
            .with_column(ColumnDef::new("weight", ColumnType::Double).with_default("0"))
            .with_column(ColumnDef::new("reconcile_stamp", ColumnType::Integer).with_default("0"))
            .with_primary_key(["publisher_id", "reconcile_stamp"])
    }

    fn migrate_to_v1(&self, transaction: &mut Transaction) -> bool {
        transaction.push(Command::create_table(Self::table_v1()));
        true
    }

    fn migrate_to_v2(&self, transaction: &mut Transaction) -> bool {
        transaction.push(Command::create_index(
            TABLE_NAME,
            PUBLISHER_ID_INDEX,
            ["publisher_id"],
        ));
        true
    }

    fn migrate_to_v4(&self, transaction: &mut Transaction) -> bool {
        let table = Self::table_v4();

        // Rows that differed only by month/year merge under the new key.
        let columns = [
            ("publisher_id", "publisher_id"),
            ("SUM(duration)", "duration"),
            ("SUM(visits)", "visits"),
            ("MAX(score)", "score"),
            ("MAX(percent)", "percent"),
            ("MAX(weight)", "weight"),
            ("reconcile_stamp", "reconcile_stamp"),
        ];

        let Some(commands) =
            rebuild_table_grouped(&table, &columns, &["publisher_id", "reconcile_stamp"])
        else {
            return false;
        };

        transaction.extend(commands);
        transaction.push(Command::create_index(
            TABLE_NAME,
            PUBLISHER_ID_INDEX,
            ["publisher_id"],
        ));
        true
    }

    fn migrate_to_v5(&self, transaction: &mut Transaction) -> bool {
        transaction.push(Command::create_index(
            TABLE_NAME,
            RECONCILE_STAMP_INDEX,
            ["reconcile_stamp"],
        ));
        true
    }
}

impl EntityMigrator for ActivityInfoMigrator {
    fn name(&self) -> &str {
        TABLE_NAME
    }

    fn migrate_to(&self, transaction: &mut Transaction, target: SchemaVersion) -> bool {
        match target {
            1 => self.migrate_to_v1(transaction),
            2 => self.migrate_to_v2(transaction),
            4 => self.migrate_to_v4(transaction),
            5 => self.migrate_to_v5(transaction),
            3 => true,
            _ => false,
        }
    }
}
