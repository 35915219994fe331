//! Migration loader for discovering migrations from the filesystem.
//!
//! The [`MigrationLoader`] scans a directory structure of the form
//!
//! ```text
//! migrations_dir/
//!   blog/
//!     0001_initial.json
//!     0002_add_field.json
//!   auth/
//!     0001_initial.json
//! ```
//!
//! deserializing each file into a full [`Migration`] (operations included)
//! and building the validated [`MigrationGraph`] over them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stratum_core::error::{StratumError, StratumResult};

use crate::graph::{Migration, MigrationGraph, MigrationKey};
use crate::serializer::SerializableMigration;

/// Discovers and loads migrations from the filesystem.
pub struct MigrationLoader {
    migrations_dir: PathBuf,
    migrations: BTreeMap<MigrationKey, Migration>,
}

impl MigrationLoader {
    /// Creates a new loader for the given migrations directory.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            migrations: BTreeMap::new(),
        }
    }

    /// Scans the filesystem, loads every migration, and builds the graph.
    ///
    /// A missing migrations directory is not an error: it yields an empty
    /// graph (a fresh project has no history yet).
    pub fn load(&mut self) -> StratumResult<MigrationGraph> {
        self.discover()?;
        let graph = Self::build_graph(self.migrations.values())?;
        tracing::debug!(
            migrations = self.migrations.len(),
            dir = %self.migrations_dir.display(),
            "migration history loaded"
        );
        Ok(graph)
    }

    /// Discovers migration files from the directory structure.
    fn discover(&mut self) -> StratumResult<()> {
        self.migrations.clear();

        let dir = &self.migrations_dir;
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| {
            StratumError::SerializationError(format!(
                "Cannot read migrations directory {}: {e}",
                dir.display()
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                StratumError::SerializationError(format!("Cannot read directory entry: {e}"))
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(app_label) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            self.discover_app(app_label, &path)?;
        }
        Ok(())
    }

    /// Loads the migration files of a single app.
    fn discover_app(&mut self, app_label: &str, app_dir: &Path) -> StratumResult<()> {
        let entries = std::fs::read_dir(app_dir).map_err(|e| {
            StratumError::SerializationError(format!(
                "Cannot read app directory {}: {e}",
                app_dir.display()
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                StratumError::SerializationError(format!("Cannot read directory entry: {e}"))
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let serialized = SerializableMigration::read_from_file(&path)?;
            if serialized.app_label != app_label {
                return Err(StratumError::ImproperlyConfigured(format!(
                    "Migration file {} declares app '{}' but lives under '{app_label}/'",
                    path.display(),
                    serialized.app_label
                )));
            }
            let migration = serialized.to_migration();
            self.migrations.insert(migration.key(), migration);
        }
        Ok(())
    }

    /// Builds a validated migration graph over a set of migrations.
    fn build_graph<'a, I>(migrations: I) -> StratumResult<MigrationGraph>
    where
        I: IntoIterator<Item = &'a Migration> + Clone,
    {
        let mut graph = MigrationGraph::new();
        for m in migrations.clone() {
            graph.add_node(&m.app_label, &m.name, m.initial);
        }
        for m in migrations {
            for dep in &m.dependencies {
                graph.add_dependency(m.key(), dep.clone())?;
            }
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Returns the loaded migrations, keyed by `(app_label, name)`.
    pub fn migrations(&self) -> &BTreeMap<MigrationKey, Migration> {
        &self.migrations
    }

    /// Returns the migrations directory.
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Builds a validated `MigrationGraph` from in-memory migrations.
    ///
    /// Useful for tests and for programmatic migration definitions that
    /// don't come from the filesystem.
    pub fn graph_from_migrations(migrations: &[&Migration]) -> StratumResult<MigrationGraph> {
        Self::build_graph(migrations.iter().copied())
    }
}
