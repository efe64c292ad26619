//! Concrete per-table migrators.

pub mod activity_info;
pub mod publisher_info;

pub use activity_info::ActivityInfoMigrator;
pub use publisher_info::PublisherInfoMigrator;

use super::migrator::EntityMigrator;

/// The built-in migrators in registration order.
///
/// The order is part of the on-disk contract: commands of one version step
/// are emitted in this order.
pub fn default_migrators() -> Vec<Box<dyn EntityMigrator>> {
    vec![
        Box::new(ActivityInfoMigrator::new()),
        Box::new(PublisherInfoMigrator::new()),
    ]
}
