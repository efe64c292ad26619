//! Migration orchestrator - walks the version range and submits one transaction.
//!
//! For a database at version `current`, every registered migrator is asked,
//! in registration order, to contribute to each step `current + 1 ..= target`.
//! A step is kept only if every migrator succeeds for it. The first failing
//! step ends the walk; the steps before it are still submitted, so the
//! database moves as far forward as it can.

use std::sync::Arc;

use tracing::{debug, info};

use super::entities::default_migrators;
use super::error::MigrationError;
use super::log::{MigrationEvent, MigrationLog, TracingLog};
use super::migrator::EntityMigrator;
use crate::storage::{Command, Executor, Transaction};
use crate::version::{SchemaVersion, COMPATIBLE_VERSION, CURRENT_SCHEMA_VERSION};

/// Orchestrator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Version to migrate to.
    pub target_version: SchemaVersion,
    /// Compatible version recorded with every migration.
    pub compatible_version: SchemaVersion,
}

impl MigrationConfig {
    /// Create a configuration using the compiled-in versions.
    pub fn new() -> Self {
        Self {
            target_version: CURRENT_SCHEMA_VERSION,
            compatible_version: COMPATIBLE_VERSION,
        }
    }

    /// Set the target version.
    pub fn with_target_version(mut self, version: SchemaVersion) -> Self {
        self.target_version = version;
        self
    }

    /// Set the compatible version.
    pub fn with_compatible_version(mut self, version: SchemaVersion) -> Self {
        self.compatible_version = version;
        self
    }

    /// Check that the compatible version does not exceed the target.
    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.compatible_version > self.target_version {
            return Err(MigrationError::InvalidConfig {
                target_version: self.target_version,
                compatible_version: self.compatible_version,
            });
        }
        Ok(())
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the registered migrators and hands the result to an executor.
pub struct MigrationOrchestrator {
    migrators: Vec<Box<dyn EntityMigrator>>,
    executor: Arc<dyn Executor>,
    log: Arc<dyn MigrationLog>,
    config: MigrationConfig,
}

impl MigrationOrchestrator {
    /// Create an orchestrator with the built-in migrators and versions.
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self {
            migrators: default_migrators(),
            executor: Arc::new(executor),
            log: Arc::new(TracingLog),
            config: MigrationConfig::default(),
        }
    }

    /// Start building a customised orchestrator.
    pub fn builder() -> MigrationOrchestratorBuilder {
        MigrationOrchestratorBuilder::default()
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Names of the registered migrators, in order.
    pub fn migrator_names(&self) -> Vec<&str> {
        self.migrators.iter().map(|m| m.name()).collect()
    }

    /// Build the migration transaction for a database at `current`.
    ///
    /// Returns `None` only when the database is already at the target.
    /// Nothing is logged or submitted.
    pub fn plan(&self, current: SchemaVersion) -> Option<Transaction> {
        self.build(current).map(|(transaction, _)| transaction)
    }

    /// Migrate a database at `current` and wait for the executor.
    ///
    /// Resolves to `Ok` when nothing had to be done or when the executor
    /// committed the transaction, including a transaction that stops short
    /// of the target. Only executor failures are reported.
    pub async fn start(&self, current: SchemaVersion) -> Result<(), MigrationError> {
        let Some((transaction, events)) = self.build(current) else {
            debug!(current, "no migration needed");
            return Ok(());
        };

        for event in events {
            self.log.record(event);
        }

        info!(
            from = current,
            to = transaction.version,
            command_count = transaction.len(),
            "submitting migration transaction"
        );

        self.executor.execute(transaction).await?;
        Ok(())
    }

    /// Walk `current + 1 ..= target`, returning the finalized transaction and
    /// the events of the walk.
    ///
    /// A database ahead of the target gets a marker-only transaction that
    /// keeps its version.
    fn build(&self, current: SchemaVersion) -> Option<(Transaction, Vec<MigrationEvent>)> {
        let target = self.config.target_version;

        if current == target {
            return None;
        }

        let mut events = Vec::new();
        if current > target {
            events.push(MigrationEvent::AheadOfTarget { current, target });
        }

        let mut transaction = Transaction::new();
        let mut migrated_version = current;

        for version in current.saturating_add(1)..=target {
            match self.migrate_step(version) {
                Some(step) => {
                    transaction.append(step);
                    events.push(MigrationEvent::Migrated { version });
                    migrated_version = version;
                }
                None => {
                    events.push(MigrationEvent::StepFailed {
                        from: version - 1,
                        to: version,
                    });
                    break;
                }
            }
        }

        transaction.version = migrated_version;
        transaction.compatible_version = self.config.compatible_version;
        transaction.push(Command::Migrate);

        Some((transaction, events))
    }

    /// Collect one step's commands from every migrator.
    ///
    /// Contributions go to a step-local buffer first, so a failure at this
    /// step discards what earlier migrators appended for it.
    fn migrate_step(&self, version: SchemaVersion) -> Option<Transaction> {
        let mut step = Transaction::new();

        for migrator in &self.migrators {
            if !migrator.migrate_to(&mut step, version) {
                debug!(migrator = migrator.name(), version, "migrator failed");
                return None;
            }
        }

        Some(step)
    }
}

/// Builder for [`MigrationOrchestrator`].
#[derive(Default)]
pub struct MigrationOrchestratorBuilder {
    migrators: Vec<Box<dyn EntityMigrator>>,
    log: Option<Arc<dyn MigrationLog>>,
    config: MigrationConfig,
}

impl MigrationOrchestratorBuilder {
    /// Register a migrator after those already registered.
    pub fn migrator(mut self, migrator: impl EntityMigrator + 'static) -> Self {
        self.migrators.push(Box::new(migrator));
        self
    }

    /// Register the built-in migrators after those already registered.
    pub fn with_default_migrators(mut self) -> Self {
        self.migrators.extend(default_migrators());
        self
    }

    /// Set the progress log. Defaults to [`TracingLog`].
    pub fn log(mut self, log: Arc<dyn MigrationLog>) -> Self {
        self.log = Some(log);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: MigrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator.
    pub fn build(
        self,
        executor: impl Executor + 'static,
    ) -> Result<MigrationOrchestrator, MigrationError> {
        self.config.validate()?;

        Ok(MigrationOrchestrator {
            migrators: self.migrators,
            executor: Arc::new(executor),
            log: self.log.unwrap_or_else(|| Arc::new(TracingLog)),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ExecutorError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Appends `NAME@v` for each version, except those listed in `fails_at`.
    struct FakeMigrator {
        name: &'static str,
        fails_at: Vec<SchemaVersion>,
        calls: Arc<Mutex<Vec<(&'static str, SchemaVersion)>>>,
    }

    impl FakeMigrator {
        fn new(name: &'static str, calls: &Arc<Mutex<Vec<(&'static str, SchemaVersion)>>>) -> Self {
            Self {
                name,
                fails_at: Vec::new(),
                calls: Arc::clone(calls),
            }
        }

        fn failing_at(mut self, version: SchemaVersion) -> Self {
            self.fails_at.push(version);
            self
        }
    }

    impl EntityMigrator for FakeMigrator {
        fn name(&self) -> &str {
            self.name
        }

        fn migrate_to(&self, transaction: &mut Transaction, target: SchemaVersion) -> bool {
            self.calls.lock().push((self.name, target));
            if self.fails_at.contains(&target) {
                return false;
            }
            transaction.push(Command::execute(format!("{}@{}", self.name, target)));
            true
        }
    }

    #[derive(Default)]
    struct FakeExecutor {
        submitted: Mutex<Vec<Transaction>>,
        fail: bool,
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn execute(&self, transaction: Transaction) -> Result<(), ExecutorError> {
            self.submitted.lock().push(transaction);
            if self.fail {
                return Err(ExecutorError::Rejected("disk full".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        events: Mutex<Vec<MigrationEvent>>,
    }

    impl MigrationLog for RecordingLog {
        fn record(&self, event: MigrationEvent) {
            self.events.lock().push(event);
        }
    }

    struct Harness {
        orchestrator: MigrationOrchestrator,
        executor: Arc<FakeExecutor>,
        log: Arc<RecordingLog>,
        calls: Arc<Mutex<Vec<(&'static str, SchemaVersion)>>>,
    }

    fn harness(target: SchemaVersion, b_fails_at: Option<SchemaVersion>, executor_fails: bool) -> Harness {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(FakeExecutor {
            submitted: Mutex::new(Vec::new()),
            fail: executor_fails,
        });
        let log = Arc::new(RecordingLog::default());

        let mut b = FakeMigrator::new("B", &calls);
        if let Some(version) = b_fails_at {
            b = b.failing_at(version);
        }

        let orchestrator = MigrationOrchestrator::builder()
            .migrator(FakeMigrator::new("A", &calls))
            .migrator(b)
            .log(log.clone())
            .config(
                MigrationConfig::new()
                    .with_target_version(target)
                    .with_compatible_version(2),
            )
            .build(Arc::clone(&executor))
            .unwrap();

        Harness {
            orchestrator,
            executor,
            log,
            calls,
        }
    }

    fn statements(tx: &Transaction) -> Vec<String> {
        tx.commands()
            .iter()
            .map(|c| match c {
                Command::Execute { statement } => statement.clone(),
                Command::Migrate => "MIGRATE".to_string(),
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_already_current_never_calls_executor() {
        let h = harness(5, None, false);

        h.orchestrator.start(5).await.unwrap();

        assert!(h.executor.submitted.lock().is_empty());
        assert!(h.calls.lock().is_empty());
        assert!(h.log.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_full_migration_interleaves_migrators_per_step() {
        let h = harness(5, None, false);

        h.orchestrator.start(3).await.unwrap();

        let submitted = h.executor.submitted.lock();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0];
        assert_eq!(statements(tx), vec!["A@4", "B@4", "A@5", "B@5", "MIGRATE"]);
        assert_eq!(tx.version, 5);
        assert_eq!(tx.compatible_version, 2);
    }

    #[tokio::test]
    async fn test_failure_at_first_step_submits_marker_only() {
        let h = harness(5, Some(4), false);

        h.orchestrator.start(3).await.unwrap();

        let submitted = h.executor.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(statements(&submitted[0]), vec!["MIGRATE"]);
        assert_eq!(submitted[0].version, 3);

        // Version 5 is never attempted.
        assert_eq!(*h.calls.lock(), vec![("A", 4), ("B", 4)]);
    }

    #[tokio::test]
    async fn test_partial_progress_is_submitted() {
        let h = harness(7, Some(6), false);

        h.orchestrator.start(3).await.unwrap();

        let submitted = h.executor.submitted.lock();
        let tx = &submitted[0];
        assert_eq!(tx.version, 5);
        assert_eq!(statements(tx), vec!["A@4", "B@4", "A@5", "B@5", "MIGRATE"]);
        assert!(!h.calls.lock().iter().any(|(_, v)| *v == 7));
    }

    #[tokio::test]
    async fn test_log_reports_each_transition() {
        let h = harness(6, Some(6), false);

        h.orchestrator.start(4).await.unwrap();

        let messages: Vec<String> = h.log.events.lock().iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["migrated to version 5", "error migrating version 5 to 6"]
        );
    }

    #[tokio::test]
    async fn test_executor_failure_is_passed_through() {
        let h = harness(5, None, true);

        let err = h.orchestrator.start(3).await.unwrap_err();

        assert!(matches!(
            err,
            MigrationError::Executor(ExecutorError::Rejected(_))
        ));
        assert_eq!(h.executor.submitted.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_ahead_of_target_submits_marker_at_current_version() {
        let h = harness(5, None, false);

        h.orchestrator.start(9).await.unwrap();

        let submitted = h.executor.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(statements(&submitted[0]), vec!["MIGRATE"]);
        assert_eq!(submitted[0].version, 9);
        assert_eq!(submitted[0].compatible_version, 2);
        assert!(h.calls.lock().is_empty());
        assert_eq!(
            *h.log.events.lock(),
            vec![MigrationEvent::AheadOfTarget {
                current: 9,
                target: 5
            }]
        );
    }

    #[test]
    fn test_plan_records_no_events() {
        let h = harness(6, Some(6), false);

        let tx = h.orchestrator.plan(4).unwrap();
        assert_eq!(tx.version, 5);
        assert!(h.orchestrator.plan(9).is_some());

        assert!(h.log.events.lock().is_empty());
        assert!(h.executor.submitted.lock().is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let h = harness(5, None, false);

        let first = serde_json::to_vec(&h.orchestrator.plan(0).unwrap()).unwrap();
        let second = serde_json::to_vec(&h.orchestrator.plan(0).unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_plan_from_zero_covers_every_step() {
        let h = harness(3, None, false);

        let tx = h.orchestrator.plan(0).unwrap();
        assert_eq!(
            statements(&tx),
            vec!["A@1", "B@1", "A@2", "B@2", "A@3", "B@3", "MIGRATE"]
        );
        assert!(tx.is_migration());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = MigrationOrchestrator::builder()
            .config(
                MigrationConfig::new()
                    .with_target_version(3)
                    .with_compatible_version(4),
            )
            .build(FakeExecutor::default());

        assert!(matches!(
            result,
            Err(MigrationError::InvalidConfig {
                target_version: 3,
                compatible_version: 4
            })
        ));
    }

    #[test]
    fn test_default_orchestrator_uses_builtin_migrators() {
        let orchestrator = MigrationOrchestrator::new(FakeExecutor::default());

        assert_eq!(
            orchestrator.migrator_names(),
            vec!["activity_info", "publisher_info"]
        );
        assert_eq!(orchestrator.config(), &MigrationConfig::default());

        let tx = orchestrator.plan(0).unwrap();
        assert_eq!(tx.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(tx.compatible_version, COMPATIBLE_VERSION);
    }
}
