//! Migration execution engine.
//!
//! The [`MigrationExecutor`] takes a [`MigrationPlan`] and applies or
//! reverts migrations in order. Intermediate [`ProjectState`]s are never
//! kept around or mutated in place: each step reconstructs the state it
//! needs by replaying the currently-applied migrations from an empty
//! snapshot, so backward steps see exactly the state their operations were
//! originally applied to.
//!
//! The [`MigrationRecorder`] tracks which migrations have been applied, both
//! in memory and in the `stratum_migrations` bookkeeping table.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use stratum_backends::DatabaseBackend;
use stratum_core::error::{StratumError, StratumResult};
use stratum_core::logging::migration_span;

use crate::graph::{Migration, MigrationGraph, MigrationKey};
use crate::schema_editor::SchemaEditor;
use crate::state::ProjectState;

/// A single step in a migration plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// The migration key: `(app_label, migration_name)`.
    pub migration: MigrationKey,
    /// If `true`, this step reverses the migration.
    pub backwards: bool,
}

impl MigrationStep {
    /// Creates a forward migration step.
    pub fn forward(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            migration: (app_label.into(), name.into()),
            backwards: false,
        }
    }

    /// Creates a backward (reverse) migration step.
    pub fn backward(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            migration: (app_label.into(), name.into()),
            backwards: true,
        }
    }
}

/// An ordered list of [`MigrationStep`]s to execute sequentially.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    /// The ordered steps to execute.
    pub steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    /// Creates a new empty migration plan.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a step to the plan.
    pub fn add_step(&mut self, step: MigrationStep) {
        self.steps.push(step);
    }

    /// Returns whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Tracks which migrations have been applied.
///
/// Operates both in-memory and against the `stratum_migrations` database
/// table. The in-memory set drives plan building; the table provides
/// persistence across runs.
#[derive(Debug, Clone, Default)]
pub struct MigrationRecorder {
    applied_migrations: BTreeSet<MigrationKey>,
}

impl MigrationRecorder {
    /// Creates a new empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the SQL to create the bookkeeping table (PostgreSQL syntax).
    pub fn ensure_schema_sql() -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"stratum_migrations\" (\
            \"id\" BIGSERIAL PRIMARY KEY, \
            \"app\" VARCHAR(255) NOT NULL, \
            \"name\" VARCHAR(255) NOT NULL, \
            \"applied\" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP\
        )"
    }

    /// Returns the SQLite-compatible SQL to create the bookkeeping table.
    pub fn ensure_schema_sql_sqlite() -> &'static str {
        "CREATE TABLE IF NOT EXISTS \"stratum_migrations\" (\
            \"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
            \"app\" TEXT NOT NULL, \
            \"name\" TEXT NOT NULL, \
            \"applied\" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP\
        )"
    }

    /// Records a migration as applied (in-memory only).
    pub fn apply(&mut self, key: MigrationKey) {
        self.applied_migrations.insert(key);
    }

    /// Records a migration as unapplied (in-memory only).
    pub fn unapply(&mut self, key: &MigrationKey) {
        self.applied_migrations.remove(key);
    }

    /// Returns the set of applied migrations.
    pub fn applied(&self) -> &BTreeSet<MigrationKey> {
        &self.applied_migrations
    }

    /// Returns whether a specific migration has been applied.
    pub fn is_applied(&self, key: &MigrationKey) -> bool {
        self.applied_migrations.contains(key)
    }

    /// Returns the SQL to record a migration as applied.
    pub fn record_applied_sql(app_label: &str, name: &str) -> String {
        format!(
            "INSERT INTO \"stratum_migrations\" (\"app\", \"name\") VALUES ('{}', '{}')",
            app_label.replace('\'', "''"),
            name.replace('\'', "''")
        )
    }

    /// Returns the SQL to remove a migration's applied record.
    pub fn record_unapplied_sql(app_label: &str, name: &str) -> String {
        format!(
            "DELETE FROM \"stratum_migrations\" WHERE \"app\" = '{}' AND \"name\" = '{}'",
            app_label.replace('\'', "''"),
            name.replace('\'', "''")
        )
    }

    /// Ensures the bookkeeping table exists in the database.
    pub fn ensure_table(&self, backend: &dyn DatabaseBackend) -> StratumResult<()> {
        let sql = if backend.vendor() == "sqlite" {
            Self::ensure_schema_sql_sqlite()
        } else {
            Self::ensure_schema_sql()
        };
        backend.execute(sql)
    }

    /// Loads applied migrations from the database into the in-memory set,
    /// creating the bookkeeping table if needed.
    pub fn load_from_db(&mut self, backend: &dyn DatabaseBackend) -> StratumResult<()> {
        self.ensure_table(backend)?;
        let rows = backend.query("SELECT \"app\", \"name\" FROM \"stratum_migrations\"")?;
        self.applied_migrations.clear();
        for row in &rows {
            let app = row.get_str("app")?.to_string();
            let name = row.get_str("name")?.to_string();
            self.applied_migrations.insert((app, name));
        }
        Ok(())
    }

    /// Records a migration as applied in the database.
    pub fn record_to_db(
        &self,
        backend: &dyn DatabaseBackend,
        app_label: &str,
        name: &str,
    ) -> StratumResult<()> {
        backend.execute(&Self::record_applied_sql(app_label, name))
    }

    /// Removes a migration's applied record from the database.
    pub fn unrecord_from_db(
        &self,
        backend: &dyn DatabaseBackend,
        app_label: &str,
        name: &str,
    ) -> StratumResult<()> {
        backend.execute(&Self::record_unapplied_sql(app_label, name))
    }
}

/// Executes migration plans using a schema editor.
pub struct MigrationExecutor {
    schema_editor: Box<dyn SchemaEditor>,
    recorder: MigrationRecorder,
}

impl MigrationExecutor {
    /// Creates a new executor with the given schema editor.
    pub fn new(schema_editor: Box<dyn SchemaEditor>) -> Self {
        Self {
            schema_editor,
            recorder: MigrationRecorder::new(),
        }
    }

    /// Creates a new executor with a pre-populated recorder.
    pub fn with_recorder(schema_editor: Box<dyn SchemaEditor>, recorder: MigrationRecorder) -> Self {
        Self {
            schema_editor,
            recorder,
        }
    }

    /// Returns a reference to the recorder.
    pub fn recorder(&self) -> &MigrationRecorder {
        &self.recorder
    }

    /// Returns a mutable reference to the recorder.
    pub fn recorder_mut(&mut self) -> &mut MigrationRecorder {
        &mut self.recorder
    }

    /// Creates a migration plan to reach the target from the current state.
    ///
    /// With no target, applies every unapplied migration in topological
    /// order. With a target `(app, name)`, brings that app exactly to the
    /// target: unapplied migrations up to it are applied, applied
    /// migrations after it are reverted (newest first).
    pub fn make_plan(
        &self,
        graph: &MigrationGraph,
        target: Option<&MigrationKey>,
    ) -> StratumResult<MigrationPlan> {
        let order = graph.topological_order()?;
        let mut plan = MigrationPlan::new();

        match target {
            None => {
                for key in &order {
                    if !self.recorder.is_applied(key) {
                        plan.add_step(MigrationStep::forward(key.0.clone(), key.1.clone()));
                    }
                }
            }
            Some(target_key) => {
                if !graph.contains(target_key) {
                    return Err(StratumError::UnknownMigration(format!(
                        "{}.{} (plan target)",
                        target_key.0, target_key.1
                    )));
                }
                let target_pos = order
                    .iter()
                    .position(|k| k == target_key)
                    .expect("target is in the graph");

                for (pos, key) in order.iter().enumerate() {
                    if key.0 == target_key.0 && pos <= target_pos && !self.recorder.is_applied(key)
                    {
                        plan.add_step(MigrationStep::forward(key.0.clone(), key.1.clone()));
                    }
                }
                for (pos, key) in order.iter().enumerate().rev() {
                    if key.0 == target_key.0 && pos > target_pos && self.recorder.is_applied(key) {
                        plan.add_step(MigrationStep::backward(key.0.clone(), key.1.clone()));
                    }
                }
            }
        }

        Ok(plan)
    }

    /// Reconstructs the project state produced by the currently-applied
    /// migrations, optionally excluding one (for backward steps).
    fn replay_state(
        &self,
        exclude: Option<&MigrationKey>,
        graph: &MigrationGraph,
        migrations: &BTreeMap<MigrationKey, Migration>,
    ) -> StratumResult<ProjectState> {
        let order = graph.topological_order()?;
        let mut state = ProjectState::new();
        for key in &order {
            if !self.recorder.is_applied(key) || exclude == Some(key) {
                continue;
            }
            let migration = migrations
                .get(key)
                .ok_or_else(|| StratumError::UnknownMigration(format!("{}.{}", key.0, key.1)))?;
            state = state.apply_all(&key.0, &migration.operations)?;
        }
        Ok(state)
    }

    /// Generates the SQL for one step and updates the in-memory recorder.
    fn step_sql(
        &mut self,
        step: &MigrationStep,
        graph: &MigrationGraph,
        migrations: &BTreeMap<MigrationKey, Migration>,
    ) -> StratumResult<Vec<String>> {
        let (app, name) = &step.migration;
        let migration = migrations.get(&step.migration).ok_or_else(|| {
            StratumError::UnknownMigration(format!("{app}.{name}"))
        })?;

        let span = migration_span(app, name);
        let _guard = span.enter();
        let mut sqls = Vec::new();

        if step.backwards {
            // Rebuild the per-operation forward states, then reverse.
            let base = self.replay_state(Some(&step.migration), graph, migrations)?;
            let mut states = Vec::with_capacity(migration.operations.len() + 1);
            states.push(base);
            for op in &migration.operations {
                let next = states.last().expect("seeded").apply(app, op.as_ref())?;
                states.push(next);
            }
            for (idx, op) in migration.operations.iter().enumerate().rev() {
                sqls.extend(op.database_backwards(
                    app,
                    self.schema_editor.as_ref(),
                    &states[idx],
                    &states[idx + 1],
                )?);
            }
            self.recorder.unapply(&step.migration);
            tracing::info!("reverted");
        } else {
            let mut state = self.replay_state(None, graph, migrations)?;
            for op in &migration.operations {
                let before = state;
                state = before.apply(app, op.as_ref())?;
                sqls.extend(op.database_forwards(
                    app,
                    self.schema_editor.as_ref(),
                    &before,
                    &state,
                )?);
            }
            self.recorder.apply(step.migration.clone());
            tracing::info!("applied");
        }
        Ok(sqls)
    }

    /// Executes a plan in memory, returning all generated SQL statements.
    ///
    /// The recorder is updated as steps complete, so consecutive plans see
    /// each other's effects, but no database is touched.
    pub fn execute_plan(
        &mut self,
        plan: &MigrationPlan,
        migrations: &BTreeMap<MigrationKey, Migration>,
        graph: &MigrationGraph,
    ) -> StratumResult<Vec<String>> {
        let mut all_sql = Vec::new();
        for step in &plan.steps {
            all_sql.extend(self.step_sql(step, graph, migrations)?);
        }
        Ok(all_sql)
    }

    /// Executes a plan against a real database.
    ///
    /// For each step, generates SQL, executes every statement (informational
    /// `--` lines are skipped), and records the migration in the
    /// `stratum_migrations` table. With `fake` set, migrations are recorded
    /// without executing their SQL.
    pub fn execute_against_db(
        &mut self,
        plan: &MigrationPlan,
        migrations: &BTreeMap<MigrationKey, Migration>,
        graph: &MigrationGraph,
        backend: &dyn DatabaseBackend,
        fake: bool,
    ) -> StratumResult<Vec<String>> {
        self.recorder.ensure_table(backend)?;

        let mut all_sql = Vec::new();
        for step in &plan.steps {
            let backwards = step.backwards;
            let (app, name) = step.migration.clone();
            let step_sql = self.step_sql(step, graph, migrations)?;

            if !fake {
                for sql in &step_sql {
                    if sql.starts_with("--") {
                        continue;
                    }
                    backend.execute(sql)?;
                }
            }
            all_sql.extend(step_sql);

            if backwards {
                self.recorder.unrecord_from_db(backend, &app, &name)?;
            } else {
                self.recorder.record_to_db(backend, &app, &name)?;
            }
        }
        Ok(all_sql)
    }
}
