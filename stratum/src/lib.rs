//! # stratum
//!
//! A declarative schema-migration engine for Rust.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. Depend on `stratum` to get the whole engine, or on individual
//! crates for finer-grained control.
//!
//! ## The shape of the engine
//!
//! Models are declared as data and collected in a
//! [`ModelRegistry`](schema::registry::ModelRegistry); an explicit
//! [`link`](schema::registry::ModelRegistry::link) pass resolves every lazy
//! cross-model reference. The
//! [`MigrationAutodetector`](migrations::MigrationAutodetector) diffs the
//! linked registry against the state reproduced by the existing migration
//! history, the [`MigrationGraph`](migrations::MigrationGraph) orders
//! migrations across apps, and the
//! [`MigrationExecutor`](migrations::MigrationExecutor) applies or reverts
//! plans against a [`DatabaseBackend`](backends::DatabaseBackend).
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use stratum::backends::SqliteBackend;
//! use stratum::migrations::{MigrationAutodetector, MigrationExecutor, SqliteSchemaEditor};
//! use stratum::migrations::loader::MigrationLoader;
//! use stratum::migrations::state::ProjectState;
//! use stratum::schema::fields::{FieldDef, FieldType};
//! use stratum::schema::model::ModelDef;
//! use stratum::schema::registry::ModelRegistry;
//!
//! // Declare and link models.
//! let mut registry = ModelRegistry::new();
//! registry.register(ModelDef::new(
//!     "blog",
//!     "Post",
//!     vec![FieldDef::new("id", FieldType::BigAutoField).primary_key()],
//! ));
//! registry.link().unwrap();
//!
//! // Generate migrations from an empty history and apply them.
//! let detector = MigrationAutodetector::new(
//!     ProjectState::new(),
//!     ProjectState::from_registry(&registry),
//! );
//! let generated = detector.changes(&BTreeMap::new()).unwrap();
//! let refs: Vec<_> = generated.iter().collect();
//! let graph = MigrationLoader::graph_from_migrations(&refs).unwrap();
//! let migrations = generated.into_iter().map(|m| (m.key(), m)).collect();
//!
//! let backend = SqliteBackend::memory().unwrap();
//! let mut executor = MigrationExecutor::new(Box::new(SqliteSchemaEditor));
//! let plan = executor.make_plan(&graph, None).unwrap();
//! executor
//!     .execute_against_db(&plan, &migrations, &graph, &backend, false)
//!     .unwrap();
//! ```

/// Core types, settings, app registry, and error types.
pub use stratum_core as core;

/// Schema layer: values, field types, model declarations, reference
/// resolution, and the linked model registry.
pub use stratum_schema as schema;

/// Database backends: backend trait and SQLite implementation.
pub use stratum_backends as backends;

/// Migration engine: state projection, auto-detection, dependency
/// ordering, execution, and migration files.
pub use stratum_migrations as migrations;

// The most commonly used types, re-exported flat.
pub use stratum_core::error::{StratumError, StratumResult};
pub use stratum_migrations::{
    Migration, MigrationAutodetector, MigrationExecutor, MigrationGraph, MigrationPlan,
    ProjectState,
};
pub use stratum_schema::{FieldDef, FieldType, ModelDef, ModelRegistry};
