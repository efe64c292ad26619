//! Command groups for common table changes.
//!
//! Helpers validate their input and return `None` instead of a partial group,
//! so a migrator can bail out before appending anything.

use crate::storage::{ColumnDef, Command, TableDef};

/// Suffix of the table holding old rows during a rebuild.
pub const TEMP_SUFFIX: &str = "_temp";

/// Replace a table's layout while keeping its rows.
///
/// Produces rename → create → copy → drop. `columns` maps source expressions
/// (usually old column names) to columns of `table`. Indexes of the old table
/// are dropped with it and must be recreated after this group.
pub fn rebuild_table(table: &TableDef, columns: &[(&str, &str)]) -> Option<Vec<Command>> {
    rebuild_table_grouped(table, columns, &[])
}

/// Like [`rebuild_table`], but old rows sharing the `group_by` source columns
/// collapse into one row. Non-grouped source expressions must then aggregate.
///
/// Used when the new layout's key is narrower than what made old rows
/// distinct.
pub fn rebuild_table_grouped(
    table: &TableDef,
    columns: &[(&str, &str)],
    group_by: &[&str],
) -> Option<Vec<Command>> {
    if table.columns.is_empty() || columns.is_empty() {
        return None;
    }

    if group_by
        .iter()
        .any(|g| !columns.iter().any(|(source, _)| source == g))
    {
        return None;
    }

    for (i, (source, destination)) in columns.iter().enumerate() {
        if source.is_empty() || !table.has_column(destination) {
            return None;
        }
        if columns[..i].iter().any(|(_, d)| d == destination) {
            return None;
        }
    }

    let temp = format!("{}{}", table.name, TEMP_SUFFIX);

    Some(vec![
        Command::rename_table(&table.name, &temp),
        Command::create_table(table.clone()),
        Command::CopyTable {
            from: temp.clone(),
            to: table.name.clone(),
            columns: columns
                .iter()
                .map(|(s, d)| (s.to_string(), d.to_string()))
                .collect(),
            group_by: group_by.iter().map(|g| g.to_string()).collect(),
        },
        Command::drop_table(temp),
    ])
}

/// Add a column. New NOT NULL columns need a default so existing rows stay valid.
pub fn add_column(table: &str, column: ColumnDef) -> Option<Command> {
    if column.not_null && column.default.is_none() {
        return None;
    }
    Some(Command::add_column(table, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ColumnType, CommandKind};

    fn target() -> TableDef {
        TableDef::new("publisher_info")
            .with_column(ColumnDef::new("publisher_id", ColumnType::Text))
            .with_column(ColumnDef::new("status", ColumnType::Integer).with_default("0"))
            .with_primary_key(["publisher_id"])
    }

    #[test]
    fn test_rebuild_table_order() {
        let commands =
            rebuild_table(&target(), &[("publisher_id", "publisher_id"), ("verified", "status")])
                .unwrap();

        let kinds: Vec<CommandKind> = commands.iter().map(Command::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::RenameTable,
                CommandKind::CreateTable,
                CommandKind::CopyTable,
                CommandKind::DropTable,
            ]
        );
        assert_eq!(
            commands[0],
            Command::rename_table("publisher_info", "publisher_info_temp")
        );
        assert_eq!(commands[3], Command::drop_table("publisher_info_temp"));
    }

    #[test]
    fn test_rebuild_table_rejects_bad_mapping() {
        assert!(rebuild_table(&target(), &[]).is_none());
        assert!(rebuild_table(&target(), &[("publisher_id", "missing")]).is_none());
        assert!(rebuild_table(&target(), &[("", "status")]).is_none());
        assert!(rebuild_table(
            &target(),
            &[("publisher_id", "status"), ("verified", "status")]
        )
        .is_none());
        assert!(rebuild_table(&TableDef::new("empty"), &[("a", "a")]).is_none());
    }

    #[test]
    fn test_grouped_rebuild() {
        let mapping = [("publisher_id", "publisher_id"), ("MAX(status)", "status")];

        let commands = rebuild_table_grouped(&target(), &mapping, &["publisher_id"]).unwrap();
        assert_eq!(
            commands[2].to_sql().as_deref(),
            Some(
                "INSERT INTO publisher_info (publisher_id, status) \
                 SELECT publisher_id, MAX(status) FROM publisher_info_temp GROUP BY publisher_id"
            )
        );

        // Grouping on something that is not copied is rejected.
        assert!(rebuild_table_grouped(&target(), &mapping, &["verified"]).is_none());
    }

    #[test]
    fn test_add_column_requires_default_for_not_null() {
        assert!(add_column("t", ColumnDef::new("c", ColumnType::Integer)).is_none());
        assert!(add_column("t", ColumnDef::new("c", ColumnType::Integer).with_default("0")).is_some());
        assert!(add_column("t", ColumnDef::nullable("c", ColumnType::Text)).is_some());
    }
}
