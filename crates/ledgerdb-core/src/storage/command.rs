//! Structural operations carried by a [`Transaction`](super::Transaction).
//!
//! Commands are plain data. Migrators build them, executors interpret them.
//! The SQL rendering here targets SQLite, which is what [`SqliteExecutor`]
//! speaks; other executors are free to interpret the variants directly.
//!
//! [`SqliteExecutor`]: super::SqliteExecutor

use serde::{Deserialize, Serialize};

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit integer.
    Integer,
    /// Floating point.
    Double,
    /// Text.
    Text,
    /// Boolean stored as 0/1.
    Boolean,
}

impl ColumnType {
    /// SQL type name.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Double => "DOUBLE",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Storage type.
    pub column_type: ColumnType,
    /// Whether NULL is rejected.
    pub not_null: bool,
    /// Default value expression, rendered verbatim.
    pub default: Option<String>,
}

impl ColumnDef {
    /// Create a new NOT NULL column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: true,
            default: None,
        }
    }

    /// Create a nullable column.
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: false,
            default: None,
        }
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Render the column clause.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.column_type);
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Primary key columns. Empty means no explicit key.
    pub primary_key: Vec<String>,
}

impl TableDef {
    /// Create an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key.
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether a column with this name is declared.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Render the CREATE TABLE statement.
    pub fn to_sql(&self) -> String {
        let mut clauses: Vec<String> = self.columns.iter().map(ColumnDef::to_sql).collect();
        if !self.primary_key.is_empty() {
            clauses.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        format!("CREATE TABLE {} ({})", self.name, clauses.join(", "))
    }
}

/// Kind tag of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Create a table.
    CreateTable,
    /// Add a column to a table.
    AddColumn,
    /// Create an index.
    CreateIndex,
    /// Rename a table.
    RenameTable,
    /// Copy rows between tables.
    CopyTable,
    /// Drop a table.
    DropTable,
    /// Raw statement.
    Execute,
    /// Terminal marker: record the transaction's versions.
    Migrate,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::CreateTable => write!(f, "create_table"),
            CommandKind::AddColumn => write!(f, "add_column"),
            CommandKind::CreateIndex => write!(f, "create_index"),
            CommandKind::RenameTable => write!(f, "rename_table"),
            CommandKind::CopyTable => write!(f, "copy_table"),
            CommandKind::DropTable => write!(f, "drop_table"),
            CommandKind::Execute => write!(f, "execute"),
            CommandKind::Migrate => write!(f, "migrate"),
        }
    }
}

/// A single structural or data operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a table.
    CreateTable {
        /// Table definition.
        table: TableDef,
    },
    /// Add one column to an existing table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column to add.
        column: ColumnDef,
    },
    /// Create a non-unique index.
    CreateIndex {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// Indexed columns.
        columns: Vec<String>,
    },
    /// Rename a table.
    RenameTable {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Copy every row of `from` into `to`.
    CopyTable {
        /// Source table.
        from: String,
        /// Destination table.
        to: String,
        /// `(source expression, destination column)` pairs.
        columns: Vec<(String, String)>,
        /// Source columns to collapse rows on. Empty copies row by row.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        group_by: Vec<String>,
    },
    /// Drop a table if it exists.
    DropTable {
        /// Table name.
        table: String,
    },
    /// Raw statement.
    Execute {
        /// Statement text.
        statement: String,
    },
    /// Terminal marker of a migration transaction.
    Migrate,
}

impl Command {
    /// Create a CREATE TABLE command.
    pub fn create_table(table: TableDef) -> Self {
        Command::CreateTable { table }
    }

    /// Create an ADD COLUMN command.
    pub fn add_column(table: impl Into<String>, column: ColumnDef) -> Self {
        Command::AddColumn {
            table: table.into(),
            column,
        }
    }

    /// Create a CREATE INDEX command.
    pub fn create_index<I, S>(table: impl Into<String>, index: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command::CreateIndex {
            table: table.into(),
            index: index.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a RENAME TABLE command.
    pub fn rename_table(from: impl Into<String>, to: impl Into<String>) -> Self {
        Command::RenameTable {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a DROP TABLE command.
    pub fn drop_table(table: impl Into<String>) -> Self {
        Command::DropTable {
            table: table.into(),
        }
    }

    /// Create a raw statement command.
    pub fn execute(statement: impl Into<String>) -> Self {
        Command::Execute {
            statement: statement.into(),
        }
    }

    /// Get the kind tag.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateTable { .. } => CommandKind::CreateTable,
            Command::AddColumn { .. } => CommandKind::AddColumn,
            Command::CreateIndex { .. } => CommandKind::CreateIndex,
            Command::RenameTable { .. } => CommandKind::RenameTable,
            Command::CopyTable { .. } => CommandKind::CopyTable,
            Command::DropTable { .. } => CommandKind::DropTable,
            Command::Execute { .. } => CommandKind::Execute,
            Command::Migrate => CommandKind::Migrate,
        }
    }

    /// Check if this is the terminal migration marker.
    pub fn is_migrate(&self) -> bool {
        matches!(self, Command::Migrate)
    }

    /// Render as a SQLite statement.
    ///
    /// Returns `None` for [`Command::Migrate`], which has no statement of its
    /// own: the executor records the transaction's versions instead.
    pub fn to_sql(&self) -> Option<String> {
        let sql = match self {
            Command::CreateTable { table } => table.to_sql(),
            Command::AddColumn { table, column } => {
                format!("ALTER TABLE {} ADD COLUMN {}", table, column.to_sql())
            }
            Command::CreateIndex {
                table,
                index,
                columns,
            } => format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                index,
                table,
                columns.join(", ")
            ),
            Command::RenameTable { from, to } => format!("ALTER TABLE {} RENAME TO {}", from, to),
            Command::CopyTable {
                from,
                to,
                columns,
                group_by,
            } => {
                let (source, destination): (Vec<&str>, Vec<&str>) = columns
                    .iter()
                    .map(|(s, d)| (s.as_str(), d.as_str()))
                    .unzip();
                let mut sql = format!(
                    "INSERT INTO {} ({}) SELECT {} FROM {}",
                    to,
                    destination.join(", "),
                    source.join(", "),
                    from
                );
                if !group_by.is_empty() {
                    sql.push_str(" GROUP BY ");
                    sql.push_str(&group_by.join(", "));
                }
                sql
            }
            Command::DropTable { table } => format!("DROP TABLE IF EXISTS {}", table),
            Command::Execute { statement } => statement.clone(),
            Command::Migrate => return None,
        };
        Some(sql)
    }
}
