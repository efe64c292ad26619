//! Migration progress reporting.
//!
//! The orchestrator reports each version transition through an injected
//! [`MigrationLog`] instead of a global logger.

use std::fmt;

use crate::version::SchemaVersion;

/// A version transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationEvent {
    /// Every migrator succeeded for this version.
    Migrated {
        /// Version reached.
        version: SchemaVersion,
    },
    /// A migrator failed; the loop stops at `from`.
    StepFailed {
        /// Last version fully reached.
        from: SchemaVersion,
        /// Version that could not be reached.
        to: SchemaVersion,
    },
    /// The stored version is newer than this build's target.
    AheadOfTarget {
        /// Stored version.
        current: SchemaVersion,
        /// Compiled-in target.
        target: SchemaVersion,
    },
}

impl fmt::Display for MigrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationEvent::Migrated { version } => write!(f, "migrated to version {}", version),
            MigrationEvent::StepFailed { from, to } => {
                write!(f, "error migrating version {} to {}", from, to)
            }
            MigrationEvent::AheadOfTarget { current, target } => write!(
                f,
                "database version {} is ahead of target version {}",
                current, target
            ),
        }
    }
}

/// Sink for migration progress.
pub trait MigrationLog: Send + Sync {
    /// Record one event. Must not fail or block for long.
    fn record(&self, event: MigrationEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl MigrationLog for TracingLog {
    fn record(&self, event: MigrationEvent) {
        match event {
            MigrationEvent::Migrated { version } => {
                tracing::info!(version, "{}", event);
            }
            MigrationEvent::StepFailed { from, to } => {
                tracing::error!(from, to, "{}", event);
            }
            MigrationEvent::AheadOfTarget { current, target } => {
                tracing::warn!(current, target, "{}", event);
            }
        }
    }
}
