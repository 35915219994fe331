//! Migration operations that describe schema changes.
//!
//! Each operation projects itself onto the in-memory [`ProjectState`] and
//! produces DDL through a [`SchemaEditor`] in both directions. State
//! projection is fallible: an operation that names a model, field, or index
//! absent from the state it is applied to fails with the offending name.

use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::fields::FieldDef;
use stratum_schema::model::{Index, ModelDef, ModelOptions};
use stratum_schema::reference::ModelKey;

use crate::schema_editor::SchemaEditor;
use crate::serializer::SerializableOperation;
use crate::state::ProjectState;

/// A single migration operation that can be applied forwards or backwards.
///
/// For `database_backwards`, `from_state` is the state the operation was
/// originally applied to (so removed models/fields can be looked up there)
/// and `to_state` is the state after its forward application.
pub trait Operation: Send + Sync {
    /// Returns a human-readable description of this operation.
    fn describe(&self) -> String;

    /// Applies this operation to the in-memory project state.
    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()>;

    /// Generates the DDL to apply this operation (forward direction).
    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>>;

    /// Generates the DDL to reverse this operation (backward direction).
    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>>;

    /// Returns whether this operation is reversible.
    fn reversible(&self) -> bool {
        true
    }

    /// Returns the serializable form of this operation, or `None` for
    /// operations (such as [`RunCode`]) that cannot round-trip through
    /// migration files.
    fn as_serializable(&self) -> Option<SerializableOperation>;
}

/// Resolves the table name for a model, preferring whichever state still
/// knows the model (its options may override the default naming).
fn table_name(app_label: &str, model_name: &str, states: &[&ProjectState]) -> String {
    let key = ModelKey::new(app_label, model_name);
    for state in states {
        if let Some(model) = state.get_model(&key) {
            return model.db_table();
        }
    }
    format!("{app_label}_{}", model_name.to_lowercase())
}

fn missing_model(op: &str, key: &ModelKey) -> StratumError {
    StratumError::StateError(format!("{op}: model '{key}' not found in state"))
}

fn missing_field(op: &str, key: &ModelKey, field: &str) -> StratumError {
    StratumError::StateError(format!("{op}: field '{field}' not found on '{key}'"))
}

// ── CreateModel ──────────────────────────────────────────────────────────

/// Creates a new model and its database table.
#[derive(Debug, Clone)]
pub struct CreateModel {
    /// The model name.
    pub name: String,
    /// The fields for the new table.
    pub fields: Vec<FieldDef>,
    /// Model-level options (indexes, unique_together, etc.).
    pub options: ModelOptions,
}

impl Operation for CreateModel {
    fn describe(&self) -> String {
        format!("Create model {}", self.name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.name.clone());
        if state.contains(&key) {
            return Err(StratumError::StateError(format!(
                "Create model: '{key}' already exists in state"
            )));
        }
        state.add_model(
            ModelDef::new(app_label, self.name.clone(), self.fields.clone())
                .with_options(self.options.clone()),
        );
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.name.clone());
        let model = to_state
            .get_model(&key)
            .ok_or_else(|| missing_model("Create model", &key))?;
        Ok(schema_editor.create_table(model))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        Ok(schema_editor.drop_table(&table_name(app_label, &self.name, &[to_state, from_state])))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::CreateModel {
            name: self.name.clone(),
            fields: self.fields.clone(),
            options: self.options.clone(),
        })
    }
}

// ── DeleteModel ──────────────────────────────────────────────────────────

/// Deletes a model and drops its table.
#[derive(Debug, Clone)]
pub struct DeleteModel {
    /// The model name to delete.
    pub name: String,
}

impl Operation for DeleteModel {
    fn describe(&self) -> String {
        format!("Delete model {}", self.name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.name.clone());
        state.remove_model(&key)?;
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        Ok(schema_editor.drop_table(&table_name(app_label, &self.name, &[from_state])))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.name.clone());
        let model = from_state
            .get_model(&key)
            .ok_or_else(|| missing_model("Delete model", &key))?;
        Ok(schema_editor.create_table(model))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::DeleteModel {
            name: self.name.clone(),
        })
    }
}

// ── RenameModel ──────────────────────────────────────────────────────────

/// Renames a model and its table, repointing references in the state.
#[derive(Debug, Clone)]
pub struct RenameModel {
    /// The current model name.
    pub old_name: String,
    /// The new model name.
    pub new_name: String,
}

impl Operation for RenameModel {
    fn describe(&self) -> String {
        format!("Rename model {} to {}", self.old_name, self.new_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let old_key = ModelKey::new(app_label, self.old_name.clone());
        state.rename_model(&old_key, &self.new_name)
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let old_table = table_name(app_label, &self.old_name, &[from_state]);
        let new_table = table_name(app_label, &self.new_name, &[to_state]);
        Ok(schema_editor.rename_table(&old_table, &new_table))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let old_table = table_name(app_label, &self.old_name, &[from_state]);
        let new_table = table_name(app_label, &self.new_name, &[to_state]);
        Ok(schema_editor.rename_table(&new_table, &old_table))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::RenameModel {
            old_name: self.old_name.clone(),
            new_name: self.new_name.clone(),
        })
    }
}

// ── AddField ─────────────────────────────────────────────────────────────

/// Adds a column to an existing table.
#[derive(Debug, Clone)]
pub struct AddField {
    /// The model name the field is being added to.
    pub model_name: String,
    /// The field to add.
    pub field: FieldDef,
}

impl Operation for AddField {
    fn describe(&self) -> String {
        format!("Add field {} to {}", self.field.name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        if model.get_field(&self.field.name).is_some() {
            return Err(StratumError::StateError(format!(
                "Add field: '{}' already exists on '{key}'",
                self.field.name
            )));
        }
        model.fields.push(self.field.clone());
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[to_state, from_state]);
        Ok(schema_editor.add_column(&table, &self.field))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[to_state, from_state]);
        Ok(schema_editor.drop_column(&table, &self.field.column))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::AddField {
            model_name: self.model_name.clone(),
            field: self.field.clone(),
        })
    }
}

// ── RemoveField ──────────────────────────────────────────────────────────

/// Removes a column from an existing table.
#[derive(Debug, Clone)]
pub struct RemoveField {
    /// The model name the field is being removed from.
    pub model_name: String,
    /// The name of the field to remove.
    pub field_name: String,
}

impl Operation for RemoveField {
    fn describe(&self) -> String {
        format!("Remove field {} from {}", self.field_name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        if model.get_field(&self.field_name).is_none() {
            return Err(missing_field("Remove field", &key, &self.field_name));
        }
        model.fields.retain(|f| f.name != self.field_name);
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let table = table_name(app_label, &self.model_name, &[from_state]);
        let column = from_state
            .get_model(&key)
            .and_then(|m| m.get_field(&self.field_name))
            .map_or_else(|| self.field_name.clone(), |f| f.column.clone());
        Ok(schema_editor.drop_column(&table, &column))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = from_state
            .get_model(&key)
            .ok_or_else(|| missing_model("Remove field", &key))?;
        let field = model
            .get_field(&self.field_name)
            .ok_or_else(|| missing_field("Remove field", &key, &self.field_name))?;
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(schema_editor.add_column(&table, field))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::RemoveField {
            model_name: self.model_name.clone(),
            field_name: self.field_name.clone(),
        })
    }
}

// ── AlterField ───────────────────────────────────────────────────────────

/// Alters a column on an existing table.
///
/// On SQLite this falls back to the table recreation strategy.
#[derive(Debug, Clone)]
pub struct AlterField {
    /// The model name containing the field.
    pub model_name: String,
    /// The name of the field being altered.
    pub field_name: String,
    /// The new field definition.
    pub field: FieldDef,
}

impl AlterField {
    fn old_field<'a>(&self, state: &'a ProjectState, app_label: &str) -> StratumResult<&'a FieldDef> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        state
            .get_model(&key)
            .ok_or_else(|| missing_model("Alter field", &key))?
            .get_field(&self.field_name)
            .ok_or_else(|| missing_field("Alter field", &key, &self.field_name))
    }
}

impl Operation for AlterField {
    fn describe(&self) -> String {
        format!("Alter field {} on {}", self.field_name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        let field = model
            .fields
            .iter_mut()
            .find(|f| f.name == self.field_name)
            .ok_or_else(|| missing_field("Alter field", &key, &self.field_name))?;
        *field = self.field.clone();
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        let old = self.old_field(from_state, app_label)?;
        Ok(schema_editor.alter_column(&table, old, &self.field))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        let old = self.old_field(from_state, app_label)?;
        Ok(schema_editor.alter_column(&table, &self.field, old))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::AlterField {
            model_name: self.model_name.clone(),
            field_name: self.field_name.clone(),
            field: self.field.clone(),
        })
    }
}

// ── RenameField ──────────────────────────────────────────────────────────

/// Renames a column on an existing table.
#[derive(Debug, Clone)]
pub struct RenameField {
    /// The model name containing the field.
    pub model_name: String,
    /// The old field name.
    pub old_name: String,
    /// The new field name.
    pub new_name: String,
}

impl Operation for RenameField {
    fn describe(&self) -> String {
        format!(
            "Rename field {} to {} on {}",
            self.old_name, self.new_name, self.model_name
        )
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        let field = model
            .fields
            .iter_mut()
            .find(|f| f.name == self.old_name)
            .ok_or_else(|| missing_field("Rename field", &key, &self.old_name))?;
        field.name.clone_from(&self.new_name);
        field.column.clone_from(&self.new_name);
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(schema_editor.rename_column(&table, &self.old_name, &self.new_name))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(schema_editor.rename_column(&table, &self.new_name, &self.old_name))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::RenameField {
            model_name: self.model_name.clone(),
            old_name: self.old_name.clone(),
            new_name: self.new_name.clone(),
        })
    }
}

// ── AddIndex ─────────────────────────────────────────────────────────────

/// Adds an index to a table.
#[derive(Debug, Clone)]
pub struct AddIndex {
    /// The model name the index is for.
    pub model_name: String,
    /// The index definition.
    pub index: Index,
}

impl Operation for AddIndex {
    fn describe(&self) -> String {
        format!(
            "Add index {} on {}",
            self.index.name.as_deref().unwrap_or("unnamed"),
            self.model_name
        )
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        model.options.indexes.push(self.index.clone());
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(schema_editor.create_index(&table, &self.index))
    }

    fn database_backwards(
        &self,
        _app_label: &str,
        schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let name = self.index.name.as_deref().unwrap_or("unnamed_index");
        Ok(schema_editor.drop_index(name))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::AddIndex {
            model_name: self.model_name.clone(),
            index: self.index.clone(),
        })
    }
}

// ── RemoveIndex ──────────────────────────────────────────────────────────

/// Removes an index from a table.
#[derive(Debug, Clone)]
pub struct RemoveIndex {
    /// The model name the index belongs to.
    pub model_name: String,
    /// The name of the index to remove.
    pub index_name: String,
}

impl Operation for RemoveIndex {
    fn describe(&self) -> String {
        format!("Remove index {} from {}", self.index_name, self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        let before = model.options.indexes.len();
        model
            .options
            .indexes
            .retain(|i| i.name.as_deref() != Some(&self.index_name));
        if model.options.indexes.len() == before {
            return Err(StratumError::StateError(format!(
                "Remove index: '{}' not found on '{key}'",
                self.index_name
            )));
        }
        Ok(())
    }

    fn database_forwards(
        &self,
        _app_label: &str,
        schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        Ok(schema_editor.drop_index(&self.index_name))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = from_state
            .get_model(&key)
            .ok_or_else(|| missing_model("Remove index", &key))?;
        let index = model
            .options
            .indexes
            .iter()
            .find(|i| i.name.as_deref() == Some(&self.index_name))
            .ok_or_else(|| {
                StratumError::StateError(format!(
                    "Remove index: '{}' not found on '{key}'",
                    self.index_name
                ))
            })?;
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(schema_editor.create_index(&table, index))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::RemoveIndex {
            model_name: self.model_name.clone(),
            index_name: self.index_name.clone(),
        })
    }
}

// ── AlterUniqueTogether ──────────────────────────────────────────────────

/// Replaces the `unique_together` constraint set on a model.
#[derive(Debug, Clone)]
pub struct AlterUniqueTogether {
    /// The model name.
    pub model_name: String,
    /// The new set of `unique_together` field groups.
    pub unique_together: Vec<Vec<String>>,
}

impl AlterUniqueTogether {
    fn constraint_sql(
        groups: &[Vec<String>],
        table: &str,
        schema_editor: &dyn SchemaEditor,
    ) -> Vec<String> {
        let mut sqls = Vec::new();
        for group in groups {
            let cols: Vec<&str> = group.iter().map(String::as_str).collect();
            sqls.extend(schema_editor.add_unique_constraint(table, &cols));
        }
        sqls
    }
}

impl Operation for AlterUniqueTogether {
    fn describe(&self) -> String {
        format!("Alter unique_together for {}", self.model_name)
    }

    fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> StratumResult<()> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let model = state.get_model_mut(&key)?;
        model.options.unique_together.clone_from(&self.unique_together);
        Ok(())
    }

    fn database_forwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let table = table_name(app_label, &self.model_name, &[from_state]);
        Ok(Self::constraint_sql(&self.unique_together, &table, schema_editor))
    }

    fn database_backwards(
        &self,
        app_label: &str,
        schema_editor: &dyn SchemaEditor,
        from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        let key = ModelKey::new(app_label, self.model_name.clone());
        let table = table_name(app_label, &self.model_name, &[from_state]);
        let old_groups = from_state
            .get_model(&key)
            .map(|m| m.options.unique_together.clone())
            .unwrap_or_default();
        Ok(Self::constraint_sql(&old_groups, &table, schema_editor))
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::AlterUniqueTogether {
            model_name: self.model_name.clone(),
            unique_together: self.unique_together.clone(),
        })
    }
}

// ── RunSql ───────────────────────────────────────────────────────────────

/// Runs raw SQL in a migration.
#[derive(Debug, Clone)]
pub struct RunSql {
    /// SQL to run in the forward direction.
    pub sql_forwards: String,
    /// SQL to run in the backward direction (`None` = irreversible).
    pub sql_backwards: Option<String>,
}

impl Operation for RunSql {
    fn describe(&self) -> String {
        "Run SQL".to_string()
    }

    fn state_forwards(&self, _app_label: &str, _state: &mut ProjectState) -> StratumResult<()> {
        // Raw SQL does not change the project state.
        Ok(())
    }

    fn database_forwards(
        &self,
        _app_label: &str,
        _schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        Ok(vec![self.sql_forwards.clone()])
    }

    fn database_backwards(
        &self,
        _app_label: &str,
        _schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        self.sql_backwards.clone().map(|sql| vec![sql]).ok_or_else(|| {
            StratumError::IrreversibleOperation("Run SQL (no backwards SQL provided)".into())
        })
    }

    fn reversible(&self) -> bool {
        self.sql_backwards.is_some()
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        Some(SerializableOperation::RunSql {
            sql_forwards: self.sql_forwards.clone(),
            sql_backwards: self.sql_backwards.clone(),
        })
    }
}

// ── RunCode ──────────────────────────────────────────────────────────────

/// The closure type used by [`RunCode`] operations.
pub type CodeFn = Box<dyn Fn() -> StratumResult<()> + Send + Sync>;

/// Runs arbitrary code during migration application or reversal.
///
/// Closures cannot round-trip through migration files, so migrations
/// containing `RunCode` must be registered in code rather than loaded from
/// disk.
pub struct RunCode {
    /// A description of what this code does.
    pub description: String,
    /// The forward closure.
    pub forwards: CodeFn,
    /// The backward closure (`None` = irreversible).
    pub backwards: Option<CodeFn>,
}

impl Operation for RunCode {
    fn describe(&self) -> String {
        format!("Run code: {}", self.description)
    }

    fn state_forwards(&self, _app_label: &str, _state: &mut ProjectState) -> StratumResult<()> {
        Ok(())
    }

    fn database_forwards(
        &self,
        _app_label: &str,
        _schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        (self.forwards)()?;
        Ok(Vec::new())
    }

    fn database_backwards(
        &self,
        _app_label: &str,
        _schema_editor: &dyn SchemaEditor,
        _from_state: &ProjectState,
        _to_state: &ProjectState,
    ) -> StratumResult<Vec<String>> {
        match &self.backwards {
            Some(f) => {
                f()?;
                Ok(Vec::new())
            }
            None => Err(StratumError::IrreversibleOperation(format!(
                "Run code: {}",
                self.description
            ))),
        }
    }

    fn reversible(&self) -> bool {
        self.backwards.is_some()
    }

    fn as_serializable(&self) -> Option<SerializableOperation> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_editor::PostgresSchemaEditor;
    use stratum_schema::fields::FieldType;
    use stratum_schema::model::ModelDef;

    fn pg() -> PostgresSchemaEditor {
        PostgresSchemaEditor
    }

    fn make_field(name: &str, ft: FieldType) -> FieldDef {
        FieldDef::new(name, ft)
    }

    fn state_with_post() -> ProjectState {
        let mut state = ProjectState::new();
        state.add_model(ModelDef::new(
            "blog",
            "post",
            vec![
                make_field("id", FieldType::BigAutoField).primary_key(),
                make_field("title", FieldType::CharField).max_length(200),
            ],
        ));
        state
    }

    fn post_key() -> ModelKey {
        ModelKey::new("blog", "post")
    }

    // ── CreateModel ─────────────────────────────────────────────────

    #[test]
    fn test_create_model_describe() {
        let op = CreateModel {
            name: "post".into(),
            fields: vec![],
            options: ModelOptions::default(),
        };
        assert_eq!(op.describe(), "Create model post");
    }

    #[test]
    fn test_create_model_state_forwards() {
        let op = CreateModel {
            name: "post".into(),
            fields: vec![make_field("id", FieldType::BigAutoField).primary_key()],
            options: ModelOptions::default(),
        };
        let mut state = ProjectState::new();
        op.state_forwards("blog", &mut state).unwrap();
        assert!(state.contains(&post_key()));
    }

    #[test]
    fn test_create_model_duplicate_fails() {
        let op = CreateModel {
            name: "post".into(),
            fields: vec![],
            options: ModelOptions::default(),
        };
        let mut state = state_with_post();
        let err = op.state_forwards("blog", &mut state).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_create_model_database_forwards() {
        let op = CreateModel {
            name: "post".into(),
            fields: vec![
                make_field("id", FieldType::BigAutoField).primary_key(),
                make_field("title", FieldType::CharField).max_length(200),
            ],
            options: ModelOptions::default(),
        };
        let mut to_state = ProjectState::new();
        op.state_forwards("blog", &mut to_state).unwrap();
        let sqls = op
            .database_forwards("blog", &pg(), &ProjectState::new(), &to_state)
            .unwrap();
        assert!(sqls[0].contains("CREATE TABLE"));
        assert!(sqls[0].contains("\"blog_post\""));
    }

    #[test]
    fn test_create_model_database_backwards_drops() {
        let op = CreateModel {
            name: "post".into(),
            fields: vec![],
            options: ModelOptions::default(),
        };
        let sqls = op
            .database_backwards("blog", &pg(), &ProjectState::new(), &ProjectState::new())
            .unwrap();
        assert!(sqls[0].contains("DROP TABLE"));
    }

    // ── DeleteModel ─────────────────────────────────────────────────

    #[test]
    fn test_delete_model_state_forwards() {
        let mut state = state_with_post();
        let op = DeleteModel { name: "post".into() };
        op.state_forwards("blog", &mut state).unwrap();
        assert!(!state.contains(&post_key()));
    }

    #[test]
    fn test_delete_missing_model_fails() {
        let mut state = ProjectState::new();
        let op = DeleteModel { name: "post".into() };
        let err = op.state_forwards("blog", &mut state).unwrap_err();
        assert!(err.to_string().contains("blog.post"));
    }

    #[test]
    fn test_delete_model_database_backwards_recreates() {
        let op = DeleteModel { name: "post".into() };
        let from_state = state_with_post();
        let sqls = op
            .database_backwards("blog", &pg(), &from_state, &ProjectState::new())
            .unwrap();
        assert!(sqls[0].contains("CREATE TABLE"));
    }

    // ── RenameModel ─────────────────────────────────────────────────

    #[test]
    fn test_rename_model_state_forwards() {
        let mut state = state_with_post();
        let op = RenameModel {
            old_name: "post".into(),
            new_name: "entry".into(),
        };
        op.state_forwards("blog", &mut state).unwrap();
        assert!(!state.contains(&post_key()));
        assert!(state.contains(&ModelKey::new("blog", "entry")));
    }

    #[test]
    fn test_rename_model_database_forwards() {
        let op = RenameModel {
            old_name: "post".into(),
            new_name: "entry".into(),
        };
        let from_state = state_with_post();
        let to_state = from_state.apply("blog", &op).unwrap();
        let sqls = op
            .database_forwards("blog", &pg(), &from_state, &to_state)
            .unwrap();
        assert!(sqls[0].contains("RENAME TO"));
        assert!(sqls[0].contains("blog_entry"));
    }

    // ── AddField ────────────────────────────────────────────────────

    #[test]
    fn test_add_field_state_forwards() {
        let mut state = state_with_post();
        let op = AddField {
            model_name: "post".into(),
            field: make_field("body", FieldType::TextField),
        };
        op.state_forwards("blog", &mut state).unwrap();
        assert_eq!(state.get_model(&post_key()).unwrap().fields.len(), 3);
    }

    #[test]
    fn test_add_duplicate_field_fails() {
        let mut state = state_with_post();
        let op = AddField {
            model_name: "post".into(),
            field: make_field("title", FieldType::CharField),
        };
        assert!(op.state_forwards("blog", &mut state).is_err());
    }

    #[test]
    fn test_add_field_database_forwards() {
        let op = AddField {
            model_name: "post".into(),
            field: make_field("body", FieldType::TextField),
        };
        let sqls = op
            .database_forwards("blog", &pg(), &state_with_post(), &ProjectState::new())
            .unwrap();
        assert!(sqls[0].contains("ADD COLUMN"));
    }

    // ── RemoveField ─────────────────────────────────────────────────

    #[test]
    fn test_remove_field_state_forwards() {
        let mut state = state_with_post();
        let op = RemoveField {
            model_name: "post".into(),
            field_name: "title".into(),
        };
        op.state_forwards("blog", &mut state).unwrap();
        assert!(state.get_model(&post_key()).unwrap().get_field("title").is_none());
    }

    #[test]
    fn test_remove_missing_field_fails() {
        let mut state = state_with_post();
        let op = RemoveField {
            model_name: "post".into(),
            field_name: "ghost".into(),
        };
        let err = op.state_forwards("blog", &mut state).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_remove_field_database_backwards_readds() {
        let op = RemoveField {
            model_name: "post".into(),
            field_name: "title".into(),
        };
        let from_state = state_with_post();
        let sqls = op
            .database_backwards("blog", &pg(), &from_state, &ProjectState::new())
            .unwrap();
        assert!(sqls[0].contains("ADD COLUMN"));
        assert!(sqls[0].contains("\"title\""));
    }

    // ── AlterField ──────────────────────────────────────────────────

    #[test]
    fn test_alter_field_state_forwards() {
        let mut state = state_with_post();
        let op = AlterField {
            model_name: "post".into(),
            field_name: "title".into(),
            field: make_field("title", FieldType::CharField).max_length(500),
        };
        op.state_forwards("blog", &mut state).unwrap();
        let model = state.get_model(&post_key()).unwrap();
        assert_eq!(model.get_field("title").unwrap().max_length, Some(500));
    }

    #[test]
    fn test_alter_field_roundtrip_restores_state() {
        let before = state_with_post();
        let op = AlterField {
            model_name: "post".into(),
            field_name: "title".into(),
            field: make_field("title", FieldType::CharField).max_length(500).nullable(),
        };
        let after = before.apply("blog", &op).unwrap();
        assert_ne!(before, after);

        // The inverse alter restores the original definition.
        let inverse = AlterField {
            model_name: "post".into(),
            field_name: "title".into(),
            field: before
                .get_model(&post_key())
                .unwrap()
                .get_field("title")
                .unwrap()
                .clone(),
        };
        let restored = after.apply("blog", &inverse).unwrap();
        assert_eq!(before, restored);
    }

    // ── RenameField ─────────────────────────────────────────────────

    #[test]
    fn test_rename_field_state_forwards() {
        let mut state = state_with_post();
        let op = RenameField {
            model_name: "post".into(),
            old_name: "title".into(),
            new_name: "headline".into(),
        };
        op.state_forwards("blog", &mut state).unwrap();
        let model = state.get_model(&post_key()).unwrap();
        assert!(model.get_field("headline").is_some());
        assert_eq!(model.get_field("headline").unwrap().column, "headline");
    }

    #[test]
    fn test_rename_field_database_both_directions() {
        let op = RenameField {
            model_name: "post".into(),
            old_name: "title".into(),
            new_name: "headline".into(),
        };
        let state = state_with_post();
        let fwd = op.database_forwards("blog", &pg(), &state, &state).unwrap();
        let bwd = op.database_backwards("blog", &pg(), &state, &state).unwrap();
        assert!(fwd[0].contains("RENAME COLUMN \"title\" TO \"headline\""));
        assert!(bwd[0].contains("RENAME COLUMN \"headline\" TO \"title\""));
    }

    // ── Index operations ────────────────────────────────────────────

    #[test]
    fn test_add_index_state_and_database() {
        let mut state = state_with_post();
        let op = AddIndex {
            model_name: "post".into(),
            index: Index::new("idx_title", vec!["title"]),
        };
        op.state_forwards("blog", &mut state).unwrap();
        assert_eq!(state.get_model(&post_key()).unwrap().options.indexes.len(), 1);

        let sqls = op.database_forwards("blog", &pg(), &state, &state).unwrap();
        assert!(sqls[0].contains("CREATE INDEX"));
    }

    #[test]
    fn test_remove_index_requires_presence() {
        let mut state = state_with_post();
        let op = RemoveIndex {
            model_name: "post".into(),
            index_name: "idx_title".into(),
        };
        assert!(op.state_forwards("blog", &mut state).is_err());
    }

    #[test]
    fn test_remove_index_database_backwards_recreates() {
        let mut from_state = state_with_post();
        AddIndex {
            model_name: "post".into(),
            index: Index::new("idx_title", vec!["title"]),
        }
        .state_forwards("blog", &mut from_state)
        .unwrap();

        let op = RemoveIndex {
            model_name: "post".into(),
            index_name: "idx_title".into(),
        };
        let sqls = op
            .database_backwards("blog", &pg(), &from_state, &ProjectState::new())
            .unwrap();
        assert!(sqls[0].contains("CREATE INDEX"));
        assert!(sqls[0].contains("idx_title"));
    }

    // ── AlterUniqueTogether ─────────────────────────────────────────

    #[test]
    fn test_alter_unique_together() {
        let mut state = state_with_post();
        let op = AlterUniqueTogether {
            model_name: "post".into(),
            unique_together: vec![vec!["title".into(), "id".into()]],
        };
        op.state_forwards("blog", &mut state).unwrap();
        assert_eq!(
            state.get_model(&post_key()).unwrap().options.unique_together.len(),
            1
        );
        let sqls = op.database_forwards("blog", &pg(), &state, &state).unwrap();
        assert!(sqls[0].contains("UNIQUE"));
    }

    // ── RunSql ──────────────────────────────────────────────────────

    #[test]
    fn test_run_sql_forwards_and_backwards() {
        let op = RunSql {
            sql_forwards: "INSERT INTO log VALUES (1)".into(),
            sql_backwards: Some("DELETE FROM log WHERE id = 1".into()),
        };
        assert!(op.reversible());
        let state = ProjectState::new();
        let fwd = op.database_forwards("app", &pg(), &state, &state).unwrap();
        assert_eq!(fwd, vec!["INSERT INTO log VALUES (1)"]);
        let bwd = op.database_backwards("app", &pg(), &state, &state).unwrap();
        assert_eq!(bwd, vec!["DELETE FROM log WHERE id = 1"]);
    }

    #[test]
    fn test_run_sql_irreversible() {
        let op = RunSql {
            sql_forwards: "SELECT 1".into(),
            sql_backwards: None,
        };
        assert!(!op.reversible());
        let state = ProjectState::new();
        let result = op.database_backwards("app", &pg(), &state, &state);
        assert!(matches!(result, Err(StratumError::IrreversibleOperation(_))));
    }

    // ── RunCode ─────────────────────────────────────────────────────

    #[test]
    fn test_run_code_executes_closure() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        let called = Arc::new(AtomicBool::new(false));
        let called2 = called.clone();
        let op = RunCode {
            description: "seed data".into(),
            forwards: Box::new(move || {
                called2.store(true, Ordering::SeqCst);
                Ok(())
            }),
            backwards: None,
        };
        let state = ProjectState::new();
        let sqls = op.database_forwards("app", &pg(), &state, &state).unwrap();
        assert!(sqls.is_empty());
        assert!(called.load(Ordering::SeqCst));
        assert!(!op.reversible());
        assert!(op.as_serializable().is_none());
    }
}
