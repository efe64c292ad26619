//! Per-entity migration contract.

use crate::storage::Transaction;
use crate::version::SchemaVersion;

/// Appends the changes that move one entity's layout from `target - 1` to `target`.
///
/// Implementations are synchronous and pure apart from appending to the
/// transaction. Returning `false` means nothing was appended: either the
/// migrator has no logic for `target` or an internal check failed. Returning
/// `true` means a complete set of commands for exactly that one step was
/// appended (possibly none, if the entity is unchanged at `target`).
///
/// A migrator's result must depend only on `target`, never on what other
/// migrators appended.
pub trait EntityMigrator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Append the commands for one version step.
    fn migrate_to(&self, transaction: &mut Transaction, target: SchemaVersion) -> bool;
}
