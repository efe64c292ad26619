//! Subcommand implementations.

use ledgerdb_core::{
    compatible_version, current_schema_version, LedgerDatabase, StorageConfig,
};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// `ledgerdb status <db>`
pub fn status(config: &StorageConfig) -> Result {
    let db = LedgerDatabase::open(config)?;
    let stored = db.stored_versions()?;

    println!("Stored schema version:     {}", stored.version);
    println!("Stored compatible version: {}", stored.compatible_version);
    println!("Build schema version:      {}", current_schema_version());
    println!("Build compatible version:  {}", compatible_version());

    let state = if stored.compatible_version > current_schema_version() {
        "incompatible (written by a newer build)"
    } else if stored.version < current_schema_version() {
        "needs migration"
    } else {
        "up to date"
    };
    println!("State: {state}");

    Ok(())
}

/// `ledgerdb plan <db>`
pub fn plan(config: &StorageConfig) -> Result {
    let db = LedgerDatabase::open(config)?;

    match db.plan()? {
        Some(transaction) => println!("{}", serde_json::to_string_pretty(&transaction)?),
        None => println!("null"),
    }

    Ok(())
}

/// `ledgerdb migrate <db>`
pub async fn migrate(config: &StorageConfig) -> Result {
    let db = LedgerDatabase::open(config)?;
    let before = db.stored_versions()?.version;

    let after = db.initialize().await?;

    if after == before {
        println!("Schema version {after}, nothing to do");
    } else {
        println!("Migrated schema version {before} -> {after}");
    }

    if after < current_schema_version() {
        tracing::warn!(
            version = after,
            target = current_schema_version(),
            "migration stopped before the target version"
        );
    }

    Ok(())
}
