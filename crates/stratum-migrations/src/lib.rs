//! # stratum-migrations
//!
//! The migration engine for stratum. Handles schema migration generation,
//! auto-detection of model changes, dependency ordering across apps, and
//! migration application and rollback.
//!
//! ## Architecture
//!
//! - [`ProjectState`] is an immutable-per-step snapshot of every model;
//!   applying an operation is a pure function producing a new snapshot.
//! - [`Migration`] is a named set of [`Operation`]s belonging to an app.
//! - [`MigrationGraph`] resolves dependency ordering across apps and is
//!   fatal on cycles.
//! - [`MigrationAutodetector`] diffs two [`ProjectState`]s to produce
//!   operations and chops them into migrations with dependencies.
//! - [`SchemaEditor`] translates operations into backend-specific DDL.
//! - [`MigrationExecutor`] applies or reverts a plan of migrations,
//!   reconstructing intermediate states by replay.
//! - [`MigrationOptimizer`] collapses operation sequences.
//!
//! ## Module Overview
//!
//! - [`state`] - `ProjectState` and state projection
//! - [`graph`] - `Migration`, `MigrationGraph`
//! - [`operations`] - `Operation` trait and all concrete operations
//! - [`autodetect`] - `MigrationAutodetector`
//! - [`schema_editor`] - `SchemaEditor` trait and Postgres/SQLite editors
//! - [`executor`] - `MigrationExecutor`, `MigrationPlan`, `MigrationRecorder`
//! - [`loader`] - `MigrationLoader` for filesystem discovery
//! - [`serializer`] - JSON migration files
//! - [`optimizer`] - `MigrationOptimizer`

// Clippy overrides appropriate for a DDL generation / migration crate.
#![allow(clippy::too_many_lines)]
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::use_self)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cognitive_complexity)]

pub mod autodetect;
pub mod executor;
pub mod graph;
pub mod loader;
pub mod operations;
pub mod optimizer;
pub mod schema_editor;
pub mod serializer;
pub mod state;

// Re-export key types at the crate root.
pub use autodetect::MigrationAutodetector;
pub use executor::{MigrationExecutor, MigrationPlan, MigrationRecorder, MigrationStep};
pub use graph::{Migration, MigrationGraph};
pub use loader::MigrationLoader;
pub use operations::Operation;
pub use optimizer::MigrationOptimizer;
pub use schema_editor::{PostgresSchemaEditor, SchemaEditor, SqliteSchemaEditor};
pub use serializer::{SerializableMigration, SerializableOperation};
pub use state::ProjectState;
