//! Migration auto-detection by comparing project states.
//!
//! The [`MigrationAutodetector`] compares an "old" [`ProjectState`] (what the
//! migration history produces) against a "new" one (what the linked model
//! registry declares) and generates the operations needed to transform one
//! into the other. Created models are ordered so that foreign-key targets
//! exist before anything references them, and migrations generated for other
//! apps in the same run become explicit dependencies.

use std::collections::{BTreeMap, BTreeSet};
use std::mem::discriminant;

use stratum_core::error::{StratumError, StratumResult};
use stratum_schema::fields::FieldDef;
use stratum_schema::model::ModelDef;
use stratum_schema::reference::ModelKey;

use crate::graph::Migration;
use crate::operations::{
    AddField, AddIndex, AlterField, AlterUniqueTogether, CreateModel, DeleteModel, Operation,
    RemoveField, RemoveIndex, RenameField,
};
use crate::serializer::generate_migration_name;
use crate::state::ProjectState;

/// Compares two [`ProjectState`]s and generates migration operations.
///
/// Detected changes:
/// - New models (`CreateModel`, FK targets first)
/// - Deleted models (`DeleteModel`)
/// - Added / removed / altered fields
/// - Renamed fields (heuristic: same type, exactly one added + one removed)
/// - Changed `unique_together`
/// - Added / removed indexes
pub struct MigrationAutodetector {
    /// The old project state (before changes).
    pub from_state: ProjectState,
    /// The new project state (after changes).
    pub to_state: ProjectState,
}

impl MigrationAutodetector {
    /// Creates a new autodetector with from and to states.
    pub fn new(from_state: ProjectState, to_state: ProjectState) -> Self {
        Self {
            from_state,
            to_state,
        }
    }

    /// Returns the keys of models that exist in `to_state` only.
    fn created_keys(&self) -> Vec<ModelKey> {
        self.to_state
            .models()
            .filter(|(key, _)| !self.from_state.contains(key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Detects differences and returns operations grouped by app label.
    ///
    /// Output order is deterministic: per app, created models first (in
    /// dependency order, ties alphabetical), then per-model field changes in
    /// key order, then deleted models.
    ///
    /// # Errors
    ///
    /// Fails with [`StratumError::CyclicDependency`] if models created
    /// within one app reference each other cyclically: such a set of
    /// operations cannot be ordered.
    pub fn detect_changes(&self) -> StratumResult<BTreeMap<String, Vec<Box<dyn Operation>>>> {
        let mut result: BTreeMap<String, Vec<Box<dyn Operation>>> = BTreeMap::new();

        // 1. New models, FK targets before their referents.
        let created = self.created_keys();
        for key in self.order_created_models(&created)? {
            let model = self.to_state.get_model(&key).expect("created model listed");
            result
                .entry(key.app_label.clone())
                .or_default()
                .push(Box::new(CreateModel {
                    name: model.name_lower(),
                    fields: model.fields.clone(),
                    options: model.options.clone(),
                }));
        }

        // 2. Field and option changes on models present in both states.
        for (key, new_model) in self.to_state.models() {
            if let Some(old_model) = self.from_state.get_model(key) {
                let app_ops = result.entry(key.app_label.clone()).or_default();
                Self::diff_model(old_model, new_model, app_ops);
            }
        }

        // 3. Deleted models.
        for (key, model) in self.from_state.models() {
            if !self.to_state.contains(key) {
                result
                    .entry(key.app_label.clone())
                    .or_default()
                    .push(Box::new(DeleteModel {
                        name: model.name_lower(),
                    }));
            }
        }

        result.retain(|_, ops| !ops.is_empty());
        Ok(result)
    }

    /// Orders created models so that every resolvable foreign-key target
    /// that is also created in this run comes before its referent. Ties
    /// break by key order.
    fn order_created_models(&self, created: &[ModelKey]) -> StratumResult<Vec<ModelKey>> {
        let created_set: BTreeSet<&ModelKey> = created.iter().collect();
        let mut in_degree: BTreeMap<&ModelKey, usize> = created.iter().map(|k| (k, 0)).collect();
        let mut dependents: BTreeMap<&ModelKey, Vec<&ModelKey>> = BTreeMap::new();

        for key in created {
            let model = self.to_state.get_model(key).expect("created model listed");
            for target in Self::relation_targets(model) {
                if target == *key {
                    continue; // self-reference: the table references itself
                }
                if let Some(&target_key) = created_set.get(&target) {
                    *in_degree.get_mut(key).expect("created key") += 1;
                    dependents.entry(target_key).or_default().push(key);
                }
            }
        }

        let mut frontier: BTreeSet<&ModelKey> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&key, _)| key)
            .collect();
        let mut ordered = Vec::with_capacity(created.len());

        while let Some(&key) = frontier.iter().next() {
            frontier.remove(key);
            ordered.push(key.clone());
            if let Some(children) = dependents.get(key) {
                for &child in children {
                    let degree = in_degree.get_mut(child).expect("created key");
                    *degree -= 1;
                    if *degree == 0 {
                        frontier.insert(child);
                    }
                }
            }
        }

        if ordered.len() != created.len() {
            let stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(key, _)| key.to_string())
                .collect();
            return Err(StratumError::CyclicDependency(format!(
                "created models reference each other: {}",
                stuck.join(", ")
            )));
        }
        Ok(ordered)
    }

    /// Resolves the relation targets of a model, ignoring malformed
    /// references (those are caught by registry linking).
    fn relation_targets(model: &ModelDef) -> Vec<ModelKey> {
        let scope = model.key();
        model
            .fields
            .iter()
            .flat_map(|f| f.field_type.relation_refs())
            .filter_map(|r| r.resolve(&scope).ok())
            .collect()
    }

    /// Diffs one model present in both states into operations.
    fn diff_model(old_model: &ModelDef, new_model: &ModelDef, ops: &mut Vec<Box<dyn Operation>>) {
        let model_name = new_model.name_lower();
        let old_by_name: BTreeMap<&str, &FieldDef> =
            old_model.fields.iter().map(|f| (f.name.as_str(), f)).collect();
        let new_by_name: BTreeMap<&str, &FieldDef> =
            new_model.fields.iter().map(|f| (f.name.as_str(), f)).collect();

        let added: Vec<&FieldDef> = new_model
            .fields
            .iter()
            .filter(|f| !old_by_name.contains_key(f.name.as_str()))
            .collect();
        let removed: Vec<&FieldDef> = old_model
            .fields
            .iter()
            .filter(|f| !new_by_name.contains_key(f.name.as_str()))
            .collect();

        // Rename heuristic: exactly one added and one removed field of the
        // same type is treated as a rename.
        let mut renamed_old: Option<&str> = None;
        let mut renamed_new: Option<&str> = None;
        if let (&[new_field], &[old_field]) = (added.as_slice(), removed.as_slice()) {
            if field_types_match(new_field, old_field) {
                ops.push(Box::new(RenameField {
                    model_name: model_name.clone(),
                    old_name: old_field.name.clone(),
                    new_name: new_field.name.clone(),
                }));
                renamed_old = Some(old_field.name.as_str());
                renamed_new = Some(new_field.name.as_str());
            }
        }

        for field in &added {
            if renamed_new != Some(field.name.as_str()) {
                ops.push(Box::new(AddField {
                    model_name: model_name.clone(),
                    field: (*field).clone(),
                }));
            }
        }

        for field in &removed {
            if renamed_old != Some(field.name.as_str()) {
                ops.push(Box::new(RemoveField {
                    model_name: model_name.clone(),
                    field_name: field.name.clone(),
                }));
            }
        }

        for new_field in &new_model.fields {
            if let Some(old_field) = old_by_name.get(new_field.name.as_str()) {
                if *old_field != new_field {
                    ops.push(Box::new(AlterField {
                        model_name: model_name.clone(),
                        field_name: new_field.name.clone(),
                        field: new_field.clone(),
                    }));
                }
            }
        }

        if old_model.options.unique_together != new_model.options.unique_together {
            ops.push(Box::new(AlterUniqueTogether {
                model_name: model_name.clone(),
                unique_together: new_model.options.unique_together.clone(),
            }));
        }

        let old_index_names: BTreeSet<&str> = old_model
            .options
            .indexes
            .iter()
            .filter_map(|i| i.name.as_deref())
            .collect();
        let new_index_names: BTreeSet<&str> = new_model
            .options
            .indexes
            .iter()
            .filter_map(|i| i.name.as_deref())
            .collect();

        for index in &old_model.options.indexes {
            if let Some(name) = index.name.as_deref() {
                if !new_index_names.contains(name) {
                    ops.push(Box::new(RemoveIndex {
                        model_name: model_name.clone(),
                        index_name: name.to_string(),
                    }));
                }
            }
        }
        for index in &new_model.options.indexes {
            if let Some(name) = index.name.as_deref() {
                if !old_index_names.contains(name) {
                    ops.push(Box::new(AddIndex {
                        model_name: model_name.clone(),
                        index: index.clone(),
                    }));
                }
            }
        }
    }

    /// Chops detected operations into one [`Migration`] per app, wiring up
    /// cross-app dependencies for models created in the same run.
    ///
    /// `next_numbers` maps each app label to the number the next migration
    /// for that app should get (see
    /// [`next_migration_number`](crate::serializer::next_migration_number));
    /// apps not present default to 1 (`0001_initial`).
    pub fn changes(
        &self,
        next_numbers: &BTreeMap<String, u32>,
    ) -> StratumResult<Vec<Migration>> {
        let ops_by_app = self.detect_changes()?;
        let created: BTreeSet<ModelKey> = self.created_keys().into_iter().collect();

        // Assign names first so cross-app dependencies can point at them.
        let names: BTreeMap<String, String> = ops_by_app
            .keys()
            .map(|app| {
                let number = next_numbers.get(app).copied().unwrap_or(1);
                (app.clone(), generate_migration_name(number))
            })
            .collect();

        let mut migrations = Vec::with_capacity(ops_by_app.len());
        for (app, ops) in ops_by_app {
            let name = names[&app].clone();
            let initial = next_numbers.get(&app).copied().unwrap_or(1) == 1;

            let mut dependencies: BTreeSet<(String, String)> = BTreeSet::new();
            for op in &ops {
                for target in self.operation_targets(op.as_ref(), &app) {
                    if target.app_label == app {
                        continue;
                    }
                    if created.contains(&target) {
                        if let Some(dep_name) = names.get(&target.app_label) {
                            dependencies.insert((target.app_label.clone(), dep_name.clone()));
                        }
                    } else {
                        tracing::debug!(
                            app = %app,
                            target = %target,
                            "relation targets a pre-existing model; no dependency needed"
                        );
                    }
                }
            }

            let mut migration = Migration::new(app, name);
            migration.initial = initial;
            migration.dependencies = dependencies.into_iter().collect();
            migration.operations = ops;
            migrations.push(migration);
        }
        Ok(migrations)
    }

    /// Returns the resolved relation targets introduced by one operation.
    fn operation_targets(&self, op: &dyn Operation, app_label: &str) -> Vec<ModelKey> {
        use crate::serializer::SerializableOperation;
        match op.as_serializable() {
            Some(SerializableOperation::CreateModel { name, fields, .. }) => {
                let scope = ModelKey::new(app_label, name);
                fields
                    .iter()
                    .flat_map(|f| f.field_type.relation_refs())
                    .filter_map(|r| r.resolve(&scope).ok())
                    .collect()
            }
            Some(SerializableOperation::AddField { model_name, field }) => {
                let scope = ModelKey::new(app_label, model_name);
                field
                    .field_type
                    .relation_refs()
                    .into_iter()
                    .filter_map(|r| r.resolve(&scope).ok())
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Checks whether two field definitions have the same type constructor
/// (used by the rename heuristic).
fn field_types_match(a: &FieldDef, b: &FieldDef) -> bool {
    discriminant(&a.field_type) == discriminant(&b.field_type)
}
