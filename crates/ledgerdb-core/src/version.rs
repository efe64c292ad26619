//! Compiled-in schema versions.
//!
//! These values describe what this build knows how to produce. They are never
//! read from the database.

/// Schema version tag. Versions increase by one per release that changes the layout.
pub type SchemaVersion = u32;

/// Newest schema version this build can migrate a database to.
pub const CURRENT_SCHEMA_VERSION: SchemaVersion = 5;

/// Oldest schema version whose reader code still works against a database
/// migrated to [`CURRENT_SCHEMA_VERSION`].
///
/// Version 5 only adds an index and a column, so version 4 readers are fine.
/// Must never decrease across releases.
pub const COMPATIBLE_VERSION: SchemaVersion = 4;

const _: () = assert!(COMPATIBLE_VERSION <= CURRENT_SCHEMA_VERSION);

/// Newest schema version this build can migrate a database to.
pub const fn current_schema_version() -> SchemaVersion {
    CURRENT_SCHEMA_VERSION
}

/// Oldest reader version compatible with [`current_schema_version`].
pub const fn compatible_version() -> SchemaVersion {
    COMPATIBLE_VERSION
}
