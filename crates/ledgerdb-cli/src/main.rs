//! LedgerDB command-line tool.
//!
//! Shows the schema version of a ledger database, previews the migration
//! transaction it would receive, and runs that migration.

mod commands;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ledgerdb_core::StorageConfig;

/// LedgerDB command-line tool
#[derive(Parser, Debug)]
#[command(name = "ledgerdb")]
#[command(version, about = "Inspect and migrate ledger databases")]
struct Cli {
    /// How long to wait on a locked database, in milliseconds.
    #[arg(long, default_value_t = 5000, global = true)]
    busy_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show stored and compiled-in schema versions.
    Status {
        /// Path to the SQLite database file.
        db: PathBuf,
    },

    /// Print the migration transaction as JSON without applying it.
    Plan {
        /// Path to the SQLite database file.
        db: PathBuf,
    },

    /// Migrate the database to the compiled-in schema version.
    Migrate {
        /// Path to the SQLite database file.
        db: PathBuf,

        /// Fail instead of creating a missing database file.
        #[arg(long)]
        existing: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerdb=info,ledgerdb_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let busy_timeout = Duration::from_millis(cli.busy_timeout_ms);

    let result = match cli.command {
        Commands::Status { db } => {
            let config = StorageConfig::new(db)
                .existing_only()
                .with_busy_timeout(busy_timeout);
            commands::status(&config)
        }
        Commands::Plan { db } => {
            let config = StorageConfig::new(db)
                .existing_only()
                .with_busy_timeout(busy_timeout);
            commands::plan(&config)
        }
        Commands::Migrate { db, existing } => {
            let mut config = StorageConfig::new(db).with_busy_timeout(busy_timeout);
            if existing {
                config = config.existing_only();
            }
            commands::migrate(&config).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
