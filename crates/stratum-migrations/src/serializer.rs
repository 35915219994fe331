//! Migration file serialization and deserialization.
//!
//! Migration files are JSON documents, one per migration, laid out as
//! `<dir>/<app_label>/<NNNN_name>.json`. [`SerializableMigration`] is the
//! on-disk form; it converts losslessly to and from [`Migration`] for every
//! operation except [`RunCode`](crate::operations::RunCode), whose closures
//! cannot round-trip through data files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::fields::FieldDef;
use stratum_schema::model::{Index, ModelOptions};

use crate::graph::Migration;
use crate::operations::{
    AddField, AddIndex, AlterField, AlterUniqueTogether, CreateModel, DeleteModel, Operation,
    RemoveField, RemoveIndex, RenameField, RenameModel, RunSql,
};

/// A serializable representation of a migration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableMigration {
    /// The app label this migration belongs to.
    pub app_label: String,
    /// The migration name (e.g. "0001_initial").
    pub name: String,
    /// Dependencies as `[app_label, name]` pairs.
    #[serde(default)]
    pub dependencies: Vec<(String, String)>,
    /// Whether this is the initial migration for the app.
    #[serde(default)]
    pub initial: bool,
    /// The operations to apply, in order.
    #[serde(default)]
    pub operations: Vec<SerializableOperation>,
}

/// A serializable representation of a single migration operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializableOperation {
    /// Create a new model/table.
    CreateModel {
        /// The model name.
        name: String,
        /// The fields for the model.
        fields: Vec<FieldDef>,
        /// Model options.
        #[serde(default)]
        options: ModelOptions,
    },
    /// Delete a model/table.
    DeleteModel {
        /// The model name.
        name: String,
    },
    /// Rename a model/table.
    RenameModel {
        /// The old model name.
        old_name: String,
        /// The new model name.
        new_name: String,
    },
    /// Add a field/column to an existing model.
    AddField {
        /// The model name.
        model_name: String,
        /// The field definition.
        field: FieldDef,
    },
    /// Remove a field/column from a model.
    RemoveField {
        /// The model name.
        model_name: String,
        /// The field name.
        field_name: String,
    },
    /// Alter a field/column on a model.
    AlterField {
        /// The model name.
        model_name: String,
        /// The field name.
        field_name: String,
        /// The new field definition.
        field: FieldDef,
    },
    /// Rename a field/column.
    RenameField {
        /// The model name.
        model_name: String,
        /// The old field name.
        old_name: String,
        /// The new field name.
        new_name: String,
    },
    /// Add an index to a table.
    AddIndex {
        /// The model name.
        model_name: String,
        /// The index definition.
        index: Index,
    },
    /// Remove an index from a table.
    RemoveIndex {
        /// The model name.
        model_name: String,
        /// The index name.
        index_name: String,
    },
    /// Replace the `unique_together` set of a model.
    AlterUniqueTogether {
        /// The model name.
        model_name: String,
        /// The new unique_together groups.
        unique_together: Vec<Vec<String>>,
    },
    /// Run raw SQL.
    RunSql {
        /// Forward SQL.
        sql_forwards: String,
        /// Backward SQL (`null` = irreversible).
        #[serde(default)]
        sql_backwards: Option<String>,
    },
}

impl SerializableOperation {
    /// Converts this serializable operation to a boxed `dyn Operation`.
    pub fn to_operation(&self) -> Box<dyn Operation> {
        match self.clone() {
            Self::CreateModel {
                name,
                fields,
                options,
            } => Box::new(CreateModel {
                name,
                fields,
                options,
            }),
            Self::DeleteModel { name } => Box::new(DeleteModel { name }),
            Self::RenameModel { old_name, new_name } => {
                Box::new(RenameModel { old_name, new_name })
            }
            Self::AddField { model_name, field } => Box::new(AddField { model_name, field }),
            Self::RemoveField {
                model_name,
                field_name,
            } => Box::new(RemoveField {
                model_name,
                field_name,
            }),
            Self::AlterField {
                model_name,
                field_name,
                field,
            } => Box::new(AlterField {
                model_name,
                field_name,
                field,
            }),
            Self::RenameField {
                model_name,
                old_name,
                new_name,
            } => Box::new(RenameField {
                model_name,
                old_name,
                new_name,
            }),
            Self::AddIndex { model_name, index } => Box::new(AddIndex { model_name, index }),
            Self::RemoveIndex {
                model_name,
                index_name,
            } => Box::new(RemoveIndex {
                model_name,
                index_name,
            }),
            Self::AlterUniqueTogether {
                model_name,
                unique_together,
            } => Box::new(AlterUniqueTogether {
                model_name,
                unique_together,
            }),
            Self::RunSql {
                sql_forwards,
                sql_backwards,
            } => Box::new(RunSql {
                sql_forwards,
                sql_backwards,
            }),
        }
    }
}

impl SerializableMigration {
    /// Converts a [`Migration`] to its serializable form.
    ///
    /// # Errors
    ///
    /// Fails with [`StratumError::SerializationError`] naming the operation
    /// if the migration contains an operation that has no data
    /// representation (e.g. `RunCode`).
    pub fn from_migration(migration: &Migration) -> StratumResult<Self> {
        let mut operations = Vec::with_capacity(migration.operations.len());
        for op in &migration.operations {
            let serializable = op.as_serializable().ok_or_else(|| {
                StratumError::SerializationError(format!(
                    "Operation '{}' in {}.{} cannot be written to a migration file",
                    op.describe(),
                    migration.app_label,
                    migration.name
                ))
            })?;
            operations.push(serializable);
        }
        Ok(Self {
            app_label: migration.app_label.clone(),
            name: migration.name.clone(),
            dependencies: migration.dependencies.clone(),
            initial: migration.initial,
            operations,
        })
    }

    /// Converts this file form back to a [`Migration`] with live operations.
    pub fn to_migration(&self) -> Migration {
        let mut migration = Migration::new(self.app_label.clone(), self.name.clone());
        migration.dependencies = self.dependencies.clone();
        migration.initial = self.initial;
        migration.operations = self
            .operations
            .iter()
            .map(SerializableOperation::to_operation)
            .collect();
        migration
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> StratumResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StratumError::SerializationError(e.to_string()))
    }

    /// Deserializes from JSON.
    pub fn from_json(content: &str) -> StratumResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| StratumError::SerializationError(format!("Invalid migration JSON: {e}")))
    }

    /// Writes this migration to a file, creating parent directories.
    pub fn write_to_file(&self, path: &Path) -> StratumResult<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a migration from a file.
    pub fn read_from_file(path: &Path) -> StratumResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

// ── Naming helpers ───────────────────────────────────────────────────────

/// Returns the path a migration file lives at:
/// `<dir>/<app_label>/<name>.json`.
pub fn migration_file_path(migrations_dir: &Path, app_label: &str, name: &str) -> PathBuf {
    migrations_dir.join(app_label).join(format!("{name}.json"))
}

/// Returns the next free migration number for an app by scanning its
/// migration directory for `NNNN_*.json` files. Starts at 1.
pub fn next_migration_number(migrations_dir: &Path, app_label: &str) -> u32 {
    let app_dir = migrations_dir.join(app_label);
    let Ok(entries) = std::fs::read_dir(app_dir) else {
        return 1;
    };
    let mut highest = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|n| n.to_str()) else {
            continue;
        };
        let digits: String = stem.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(number) = digits.parse::<u32>() {
            highest = highest.max(number);
        }
    }
    highest + 1
}

/// Generates a migration name from its sequence number:
/// `0001_initial` for the first, `NNNN_auto` afterwards.
pub fn generate_migration_name(number: u32) -> String {
    if number == 1 {
        "0001_initial".to_string()
    } else {
        format!("{number:04}_auto")
    }
}
