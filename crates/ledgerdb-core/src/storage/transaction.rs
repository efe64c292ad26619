//! Ordered command buffer handed to an executor as one atomic unit.

use serde::{Deserialize, Serialize};

use super::command::Command;
use crate::version::SchemaVersion;

/// An ordered, append-only sequence of commands plus version metadata.
///
/// Commands are applied in insertion order. Once passed to an
/// [`Executor`](super::Executor) the buffer is moved and can no longer be
/// touched by its builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Schema version recorded when the transaction commits.
    pub version: SchemaVersion,
    /// Compatible version recorded when the transaction commits.
    pub compatible_version: SchemaVersion,
    commands: Vec<Command>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Move every command of `other` to the end of this buffer.
    ///
    /// The version fields of `other` are ignored.
    pub fn append(&mut self, other: Transaction) -> &mut Self {
        self.commands.extend(other.commands);
        self
    }

    /// Get the queued commands.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consume the transaction, returning its commands.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Get the number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if no commands are queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Check if the buffer ends with the migration marker.
    pub fn is_migration(&self) -> bool {
        self.commands.last().is_some_and(Command::is_migrate)
    }
}

impl Extend<Command> for Transaction {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}
